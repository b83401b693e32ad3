use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceStatus;
use crate::model::late_deduction::LateDeductionLog;
use crate::policy::clock::round2;
use crate::policy::late::{LatePolicy, plan_deduction};
use crate::utils::settings_cache;

/// Outcome of a policy run. Errors are folded into `success: false` so the
/// invoking UI never sees an exception-shaped response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PolicyOutcome {
    pub success: bool,
    #[schema(example = "Deducted 2 day(s) for 5 late days")]
    pub message: String,
}

impl PolicyOutcome {
    fn ok(message: impl Into<String>) -> Self {
        PolicyOutcome {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        PolicyOutcome {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ApplyLatePolicy {
    pub employee_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct ApplyLatePolicyForAll {
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
}

/// First day of the month and of the next month, for a half-open date range.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((start, end))
}

/// Convert an employee's accumulated late days for one month into a
/// leave-balance deduction, incrementally: only the delta since the last run
/// is charged, so repeated invocations never double-deduct.
pub async fn apply_for_employee(
    pool: &MySqlPool,
    employee_id: u64,
    year: i32,
    month: u32,
) -> PolicyOutcome {
    match try_apply(pool, employee_id, year, month).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, employee_id, year, month, "Late policy run failed");
            PolicyOutcome::failed(e.to_string())
        }
    }
}

async fn try_apply(
    pool: &MySqlPool,
    employee_id: u64,
    year: i32,
    month: u32,
) -> Result<PolicyOutcome, sqlx::Error> {
    let Some(settings) = settings_cache::get(pool).await? else {
        return Ok(PolicyOutcome::failed("Settings not found"));
    };

    // configuration gate, not an error
    let Some(leave_type_id) = settings.late_policy_leave_type_id else {
        return Ok(PolicyOutcome::ok(
            "Late policy not configured (no leave type set)",
        ));
    };

    let Some((month_start, month_end)) = month_bounds(year, month) else {
        return Ok(PolicyOutcome::failed(format!("Invalid month: {}", month)));
    };

    let policy = LatePolicy {
        max_late_days: settings.max_late_days,
        deduction_per_day: settings.late_policy_deduction_per_day,
    };

    let late_count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM attendance
        WHERE employee_id = ? AND status = ? AND date >= ? AND date < ?
        "#,
    )
    .bind(employee_id)
    .bind(AttendanceStatus::Late)
    .bind(month_start)
    .bind(month_end)
    .fetch_one(pool)
    .await?;

    let log = sqlx::query_as::<_, LateDeductionLog>(
        r#"
        SELECT id, employee_id, year, month, last_deducted_late_count,
               total_deducted, leave_type_id
        FROM late_deductions_log
        WHERE employee_id = ? AND year = ? AND month = ?
        "#,
    )
    .bind(employee_id)
    .bind(year)
    .bind(month)
    .fetch_optional(pool)
    .await?;

    let last_deducted_count = log
        .as_ref()
        .map(|l| l.last_deducted_late_count)
        .unwrap_or(0);
    let plan = plan_deduction(&policy, late_count, last_deducted_count);

    if !plan.has_new_deduction() {
        // the log is deliberately left untouched here, even when the late
        // count grew inside the free allowance
        return Ok(PolicyOutcome::ok(format!(
            "No new deduction (late days: {}, max: {})",
            late_count, policy.max_late_days
        )));
    }

    charge_balance(pool, employee_id, leave_type_id, year, plan.new_deduction).await?;

    match log {
        Some(log) => {
            sqlx::query(
                r#"
                UPDATE late_deductions_log
                SET last_deducted_late_count = ?, total_deducted = ?
                WHERE id = ?
                "#,
            )
            .bind(plan.late_count)
            .bind(round2(log.total_deducted + plan.new_deduction))
            .bind(log.id)
            .execute(pool)
            .await?;
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO late_deductions_log
                    (employee_id, year, month, last_deducted_late_count, total_deducted, leave_type_id)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(employee_id)
            .bind(year)
            .bind(month)
            .bind(plan.late_count)
            .bind(plan.new_deduction)
            .bind(leave_type_id)
            .execute(pool)
            .await?;
        }
    }

    Ok(PolicyOutcome::ok(format!(
        "Deducted {} day(s) for {} late days",
        plan.new_deduction, plan.late_count
    )))
}

/// Add the deduction to the employee's balance, creating the balance row
/// (seeded with the leave type's default allotment) when none exists yet.
async fn charge_balance(
    pool: &MySqlPool,
    employee_id: u64,
    leave_type_id: u64,
    year: i32,
    deduction: f64,
) -> Result<(), sqlx::Error> {
    let balance = sqlx::query_as::<_, (u64, f64)>(
        r#"
        SELECT id, used_days
        FROM leave_balances
        WHERE employee_id = ? AND leave_type_id = ? AND year = ?
        "#,
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .bind(year)
    .fetch_optional(pool)
    .await?;

    match balance {
        Some((balance_id, used_days)) => {
            sqlx::query("UPDATE leave_balances SET used_days = ? WHERE id = ?")
                .bind(round2(used_days + deduction))
                .bind(balance_id)
                .execute(pool)
                .await?;
        }
        None => {
            let default_days =
                sqlx::query_scalar::<_, f64>("SELECT default_days FROM leave_types WHERE id = ?")
                    .bind(leave_type_id)
                    .fetch_optional(pool)
                    .await?
                    .unwrap_or(0.0);

            sqlx::query(
                r#"
                INSERT INTO leave_balances (employee_id, leave_type_id, year, total_days, used_days)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(employee_id)
            .bind(leave_type_id)
            .bind(year)
            .bind(default_days)
            .bind(deduction)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

/// Apply late policy for one employee (Admin)
#[utoipa::path(
    post,
    path = "/api/v1/late-policy/apply",
    request_body = ApplyLatePolicy,
    responses(
        (status = 200, description = "Policy outcome", body = PolicyOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Late policy"
)]
pub async fn apply(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ApplyLatePolicy>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let outcome =
        apply_for_employee(pool.get_ref(), payload.employee_id, payload.year, payload.month).await;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Apply late policy for all active employees (Admin)
#[utoipa::path(
    post,
    path = "/api/v1/late-policy/apply-all",
    request_body = ApplyLatePolicyForAll,
    responses(
        (status = 200, description = "Batch outcome", body = PolicyOutcome),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Late policy"
)]
pub async fn apply_all(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ApplyLatePolicyForAll>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employees = match sqlx::query_scalar::<_, u64>(
        "SELECT id FROM employees WHERE is_active = TRUE AND role <> 'admin'",
    )
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load employees for late policy batch");
            return Ok(HttpResponse::Ok().json(PolicyOutcome::failed(e.to_string())));
        }
    };

    if employees.is_empty() {
        return Ok(HttpResponse::Ok().json(PolicyOutcome::failed("No active employees found")));
    }

    // one at a time; a failing employee is skipped, not fatal
    let total = employees.len();
    let mut processed = 0usize;
    for employee_id in employees {
        let outcome =
            apply_for_employee(pool.get_ref(), employee_id, payload.year, payload.month).await;
        if outcome.success {
            processed += 1;
        }
    }

    Ok(HttpResponse::Ok().json(PolicyOutcome::ok(format!(
        "Processed {} / {} employees",
        processed, total
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_are_half_open() {
        let (start, end) = month_bounds(2024, 3).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(month_bounds(2024, 0).is_none());
        assert!(month_bounds(2024, 13).is_none());
    }
}
