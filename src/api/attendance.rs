use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;
use serde::Deserialize;
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::policy::clock::{self, CutoffTime};
use crate::utils::settings_cache;

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    responses(
        (status = 200, description = "Clocked in successfully", body = Object, example = json!({
            "message": "Clocked in successfully"
        })),
        (status = 400, description = "Already clocked in today", body = Object, example = json!({
            "message": "Already clocked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, clock_in, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(clock::local_today())
    .bind(clock::local_now())
    .bind(AttendanceStatus::Present)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Clocked in successfully"
        }))),

        Err(e) => {
            // Duplicate clock-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already clocked in today"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id, "Clock-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Clock-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/clock-out",
    responses(
        (status = 200, description = "Clocked out successfully", body = Object, example = json!({
            "message": "Clocked out successfully",
            "totalHours": 8.5
        })),
        (status = 400, description = "No active clock-in found for today", body = Object, example = json!({
            "message": "No active clock-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let today = clock::local_today();

    let open = sqlx::query_as::<_, (u64, Option<NaiveDateTime>)>(
        r#"
        SELECT id, clock_in
        FROM attendance
        WHERE employee_id = ? AND date = ? AND clock_in IS NOT NULL AND clock_out IS NULL
        "#,
    )
    .bind(employee_id)
    .bind(today)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Clock-out lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some((attendance_id, Some(clock_in))) = open else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active clock-in found for today"
        })));
    };

    let now = clock::local_now();
    let Some(total_hours) = clock::elapsed_hours(clock_in, now) else {
        // clock-in after "now" is corrupt data; refuse to write a negative span
        tracing::warn!(attendance_id, "Clock-in is later than clock-out; skipping");
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Attendance record has an invalid clock-in"
        })));
    };

    sqlx::query(
        r#"
        UPDATE attendance
        SET clock_out = ?, total_hours = ?
        WHERE id = ? AND clock_out IS NULL
        "#,
    )
    .bind(now)
    .bind(total_hours)
    .bind(attendance_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Clock-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Clocked out successfully",
        "totalHours": total_hours
    })))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by attendance status
    #[schema(example = "late")]
    pub status: Option<String>,
    /// Start of a date range (inclusive)
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    /// End of a date range (inclusive)
    #[schema(example = "2026-01-31", format = "date", value_type = Option<String>)]
    pub to: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Status(AttendanceStatus),
    Date(NaiveDate),
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<Attendance>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Attendance list (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        let status: AttendanceStatus = status
            .parse()
            .map_err(|_| actix_web::error::ErrorBadRequest("Invalid attendance status"))?;
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Status(status));
    }

    if let Some(from) = query.from {
        where_sql.push_str(" AND date >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        where_sql.push_str(" AND date <= ?");
        args.push(FilterValue::Date(to));
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Status(s) => count_q.bind(*s),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count attendance records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, date, clock_in, clock_out, total_hours, status
        FROM attendance
        {}
        ORDER BY date DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Attendance>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Status(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch attendance list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/* =========================
Auto clock-out sweep
========================= */

#[derive(Debug, PartialEq, Eq)]
pub enum SweepOutcome {
    /// No settings row or no cutoff configured.
    NotConfigured,
    /// Cutoff is configured but still in the future today.
    NotReached,
    /// Sweep ran; `updated` of `pending` unclosed records were closed.
    Processed { updated: usize, pending: usize },
}

#[derive(Debug, Display)]
pub enum SweepError {
    #[display(fmt = "Invalid auto clock-out time format")]
    BadCutoff,
    #[display(fmt = "{}", _0)]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for SweepError {
    fn from(e: sqlx::Error) -> Self {
        SweepError::Db(e)
    }
}

/// Rows that can be closed at the cutoff, with their computed hours.
/// Hours are measured to the cutoff, not to "now". Records with a missing or
/// future clock-in are dropped rather than written.
fn plan_closures(
    cutoff_at: NaiveDateTime,
    unclosed: &[(u64, Option<NaiveDateTime>)],
) -> Vec<(u64, f64)> {
    unclosed
        .iter()
        .filter_map(|(id, clock_in)| {
            let clock_in = (*clock_in)?;
            match clock::elapsed_hours(clock_in, cutoff_at) {
                Some(hours) => Some((*id, hours)),
                None => {
                    tracing::warn!(attendance_id = *id, "Clock-in after cutoff; skipping record");
                    None
                }
            }
        })
        .collect()
}

/// Close every attendance record for today that has a clock-in but no
/// clock-out, once the configured cutoff has passed. Each row is handled
/// independently: a bad or failing row is skipped, the rest still close.
/// Re-running after all records are closed is a no-op, and concurrent runs
/// (ticker + manual trigger) just overwrite each other with the same values.
pub async fn run_sweep(pool: &MySqlPool) -> Result<SweepOutcome, SweepError> {
    let Some(settings) = settings_cache::get(pool).await? else {
        return Ok(SweepOutcome::NotConfigured);
    };
    let Some(raw_cutoff) = settings.auto_clock_out_time.filter(|s| !s.trim().is_empty()) else {
        return Ok(SweepOutcome::NotConfigured);
    };

    let cutoff: CutoffTime = raw_cutoff.parse().map_err(|_| SweepError::BadCutoff)?;

    let today = clock::local_today();
    let cutoff_at = cutoff.on(today);
    if clock::local_now() < cutoff_at {
        return Ok(SweepOutcome::NotReached);
    }

    let unclosed = sqlx::query_as::<_, (u64, Option<NaiveDateTime>)>(
        r#"
        SELECT id, clock_in
        FROM attendance
        WHERE date = ? AND clock_in IS NOT NULL AND clock_out IS NULL
        "#,
    )
    .bind(today)
    .fetch_all(pool)
    .await?;

    let pending = unclosed.len();
    let mut updated = 0usize;

    for (attendance_id, total_hours) in plan_closures(cutoff_at, &unclosed) {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET clock_out = ?, total_hours = ?
            WHERE id = ?
            "#,
        )
        .bind(cutoff_at)
        .bind(total_hours)
        .bind(attendance_id)
        .execute(pool)
        .await;

        match result {
            Ok(_) => updated += 1,
            Err(e) => {
                tracing::warn!(error = %e, attendance_id, "Auto clock-out update failed");
            }
        }
    }

    Ok(SweepOutcome::Processed { updated, pending })
}

/// Auto clock-out endpoint (Admin)
#[utoipa::path(
    post,
    path = "/api/v1/attendance/auto-clock-out",
    responses(
        (status = 200, description = "Sweep result", body = Object, example = json!({
            "message": "Successfully processed 3 attendance records",
            "processedCount": 3
        })),
        (status = 400, description = "Invalid auto clock-out time format"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn auto_clock_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    match run_sweep(pool.get_ref()).await {
        Ok(SweepOutcome::NotConfigured) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Auto clock-out time not configured"
        }))),
        Ok(SweepOutcome::NotReached) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Auto clock-out time not reached yet"
        }))),
        Ok(SweepOutcome::Processed { pending: 0, .. }) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "No unclosed attendance records to process"
            })))
        }
        Ok(SweepOutcome::Processed { updated, .. }) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": format!("Successfully processed {} attendance records", updated),
                "processedCount": updated
            })))
        }
        Err(SweepError::BadCutoff) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid auto clock-out time format"
        }))),
        Err(SweepError::Db(e)) => {
            tracing::error!(error = %e, "Auto clock-out sweep failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn closes_every_pending_row_at_the_cutoff() {
        let cutoff_at = at(19, 0);
        let unclosed = vec![
            (1, Some(at(9, 0))),
            (2, Some(at(10, 30))),
            (3, Some(at(13, 15))),
        ];
        let closures = plan_closures(cutoff_at, &unclosed);
        assert_eq!(closures, vec![(1, 10.0), (2, 8.5), (3, 5.75)]);
    }

    #[test]
    fn skips_rows_with_a_clock_in_after_the_cutoff() {
        let cutoff_at = at(19, 0);
        let unclosed = vec![(1, Some(at(20, 0))), (2, Some(at(9, 0)))];
        let closures = plan_closures(cutoff_at, &unclosed);
        assert_eq!(closures, vec![(2, 10.0)]);
    }

    #[test]
    fn skips_rows_without_a_clock_in() {
        let cutoff_at = at(19, 0);
        let closures = plan_closures(cutoff_at, &[(1, None)]);
        assert!(closures.is_empty());
    }

    #[test]
    fn nothing_pending_means_nothing_planned() {
        assert!(plan_closures(at(19, 0), &[]).is_empty());
    }
}
