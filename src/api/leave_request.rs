use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::leave_request::{HalfDayPeriod, LeaveRequest, LeaveStatus};
use crate::notify::{self, LeaveNotification};
use crate::policy::clock::{self, round2};
use crate::policy::leave_days::{approved_leave_days, requested_leave_days};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    pub leave_type_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    #[serde(default)]
    pub half_day: bool,
    #[schema(example = "first_half", value_type = Option<String>)]
    pub half_day_period: Option<HalfDayPeriod>,
    pub document_url: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by leave status
    #[schema(example = "pending")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Status(LeaveStatus),
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Leave type name and whether a supporting document is mandatory for it.
/// Sick/medical leave cannot be requested without one.
fn requires_document(type_name: &str) -> bool {
    let name = type_name.to_lowercase();
    name.contains("sick") || name.contains("medical")
}

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, leave_type_id, start_date, end_date, half_day,
    half_day_period, status, reason, document_url, reviewed_by, reviewed_at,
    created_at
"#;

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let type_name = sqlx::query_scalar::<_, String>(
        "SELECT name FROM leave_types WHERE id = ? AND is_active = TRUE",
    )
    .bind(payload.leave_type_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch leave type");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(type_name) = type_name else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Unknown or inactive leave type"
        })));
    };

    if requires_document(&type_name) && payload.document_url.is_none() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "A supporting document is required for this leave type"
        })));
    }

    let days = requested_leave_days(payload.start_date, payload.end_date, payload.half_day);
    if days <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid leave date range"
        })));
    }

    // validated against the current year's balance
    let year = clock::local_today().year();
    let balance = sqlx::query_as::<_, (f64, f64)>(
        r#"
        SELECT total_days, used_days
        FROM leave_balances
        WHERE employee_id = ? AND leave_type_id = ? AND year = ?
        "#,
    )
    .bind(employee_id)
    .bind(payload.leave_type_id)
    .bind(year)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch leave balance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let remaining = balance
        .map(|(total, used)| total - used)
        .unwrap_or(0.0);
    if days > remaining {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Insufficient leave balance"
        })));
    }

    let half_day_period = if payload.half_day {
        payload.half_day_period
    } else {
        None
    };

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type_id, start_date, end_date, half_day,
             half_day_period, status, reason, document_url)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.leave_type_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.half_day)
    .bind(half_day_period)
    .bind(LeaveStatus::Pending)
    .bind(&payload.reason)
    .bind(&payload.document_url)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Notify HR of the new request; must not block or fail the submission.
    let employee_name = sqlx::query_scalar::<_, String>(
        "SELECT CONCAT(first_name, ' ', COALESCE(last_name, '')) FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .ok()
    .flatten();

    if let Some(employee_name) = employee_name {
        notify::dispatch(
            config.notify_webhook_url.clone(),
            LeaveNotification::NewRequest {
                employee_name: employee_name.trim().to_owned(),
                leave_type_name: type_name,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        );
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": "pending"
    })))
}

/* =========================
Update own pending request
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to update")
    ),
    request_body = CreateLeave,
    responses(
        (status = 200, description = "Leave request updated", body = Object, example = json!({
            "message": "Leave request updated"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;
    let leave_id = path.into_inner();

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let days = requested_leave_days(payload.start_date, payload.end_date, payload.half_day);
    if days <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid leave date range"
        })));
    }

    let half_day_period = if payload.half_day {
        payload.half_day_period
    } else {
        None
    };

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET leave_type_id = ?, start_date = ?, end_date = ?, half_day = ?,
            half_day_period = ?, reason = ?, document_url = ?
        WHERE id = ? AND employee_id = ? AND status = ?
        "#,
    )
    .bind(payload.leave_type_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.half_day)
    .bind(half_day_period)
    .bind(&payload.reason)
    .bind(&payload.document_url)
    .bind(leave_id)
    .bind(employee_id)
    .bind(LeaveStatus::Pending)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to update leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request updated"
    })))
}

/* =========================
Approve / reject (HR/Admin)
========================= */

/// Row fetched ahead of a review so the balance can be charged and the
/// employee notified without further lookups.
#[derive(sqlx::FromRow)]
struct ReviewTarget {
    employee_id: u64,
    leave_type_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    half_day: bool,
    employee_email: String,
    employee_name: String,
    leave_type_name: String,
}

async fn review_leave(
    auth: &AuthUser,
    pool: &MySqlPool,
    config: &Config,
    leave_id: u64,
    status: LeaveStatus,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let target = sqlx::query_as::<_, ReviewTarget>(
        r#"
        SELECT lr.employee_id, lr.leave_type_id, lr.start_date, lr.end_date, lr.half_day,
               e.email AS employee_email,
               CONCAT(e.first_name, ' ', COALESCE(e.last_name, '')) AS employee_name,
               lt.name AS leave_type_name
        FROM leave_requests lr
        JOIN employees e ON e.id = lr.employee_id
        JOIN leave_types lt ON lt.id = lr.leave_type_id
        WHERE lr.id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(target) = target else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    };

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?, reviewed_by = ?, reviewed_at = ?
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(status)
    .bind(auth.user_id)
    .bind(clock::local_now())
    .bind(leave_id)
    .bind(LeaveStatus::Pending)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Leave review failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    // On approve: charge the balance for the year the leave starts in. If no
    // balance row exists the deduction is silently skipped; none is created
    // on this path.
    if status == LeaveStatus::Approved {
        let days = approved_leave_days(target.start_date, target.end_date, target.half_day);
        let year = target.start_date.year();

        let balance = sqlx::query_as::<_, (u64, f64)>(
            r#"
            SELECT id, used_days
            FROM leave_balances
            WHERE employee_id = ? AND leave_type_id = ? AND year = ?
            "#,
        )
        .bind(target.employee_id)
        .bind(target.leave_type_id)
        .bind(year)
        .fetch_optional(pool)
        .await;

        match balance {
            Ok(Some((balance_id, used_days))) => {
                if let Err(e) = sqlx::query("UPDATE leave_balances SET used_days = ? WHERE id = ?")
                    .bind(round2(used_days + days))
                    .bind(balance_id)
                    .execute(pool)
                    .await
                {
                    tracing::warn!(error = %e, leave_id, "Failed to charge leave balance");
                }
            }
            Ok(None) => {
                tracing::debug!(
                    leave_id,
                    employee_id = target.employee_id,
                    "No balance row for approved leave; deduction skipped"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, leave_id, "Failed to fetch balance for approval");
            }
        }
    }

    notify::dispatch(
        config.notify_webhook_url.clone(),
        LeaveNotification::StatusUpdate {
            employee_email: target.employee_email,
            employee_name: target.employee_name.trim().to_owned(),
            leave_type_name: target.leave_type_name,
            start_date: target.start_date,
            end_date: target.end_date,
            status,
        },
    );

    let message = match status {
        LeaveStatus::Approved => "Leave approved",
        LeaveStatus::Rejected => "Leave rejected",
        LeaveStatus::Pending => "Leave pending",
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": message })))
}

#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    review_leave(
        &auth,
        pool.get_ref(),
        config.get_ref(),
        path.into_inner(),
        LeaveStatus::Approved,
    )
    .await
}

#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    review_leave(
        &auth,
        pool.get_ref(),
        config.get_ref(),
        path.into_inner(),
        LeaveStatus::Rejected,
    )
    .await
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);
    let leave = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match leave {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        let status: LeaveStatus = status
            .parse()
            .map_err(|_| actix_web::error::ErrorBadRequest("Invalid leave status"))?;
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Status(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Status(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        "SELECT {} FROM leave_requests{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        LEAVE_COLUMNS, where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Status(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sick_and_medical_types_require_a_document() {
        assert!(requires_document("Sick Leave"));
        assert!(requires_document("medical"));
        assert!(!requires_document("Annual Leave"));
    }
}
