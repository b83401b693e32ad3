use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_type::LeaveType;
use crate::policy::clock::round2;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct BalanceFilter {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by year
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct Allotment {
    pub leave_type_id: u64,
    #[schema(example = 18.0)]
    pub total_days: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct AllotLeave {
    pub employee_ids: Vec<u64>,
    #[schema(example = 2026)]
    pub year: i32,
    pub allotments: Vec<Allotment>,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceListResponse {
    pub data: Vec<LeaveBalance>,
}

/// Active leave types, for request forms and allotment screens.
#[utoipa::path(
    get,
    path = "/api/v1/leave/types",
    responses(
        (status = 200, description = "Active leave types", body = [LeaveType]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_type_list(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let types = sqlx::query_as::<_, LeaveType>(
        "SELECT id, name, default_days, is_active FROM leave_types WHERE is_active = TRUE ORDER BY name",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch leave types");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(types))
}

/// Leave balance list (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/leave/balances",
    params(BalanceFilter),
    responses(
        (status = 200, description = "Leave balances", body = BalanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn balance_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<BalanceFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut employee_bind = None;
    let mut year_bind = None;

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        employee_bind = Some(emp_id);
    }
    if let Some(year) = query.year {
        where_sql.push_str(" AND year = ?");
        year_bind = Some(year);
    }

    let sql = format!(
        "SELECT id, employee_id, leave_type_id, year, total_days, used_days \
         FROM leave_balances{} ORDER BY employee_id, leave_type_id",
        where_sql
    );

    let mut q = sqlx::query_as::<_, LeaveBalance>(&sql);
    if let Some(emp_id) = employee_bind {
        q = q.bind(emp_id);
    }
    if let Some(year) = year_bind {
        q = q.bind(year);
    }

    let balances = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch leave balances");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(BalanceListResponse { data: balances }))
}

/// Allot leave balances (HR/Admin)
///
/// Upsert keyed on (employee, leave type, year): `total_days` is replaced
/// with the newly entered value, `used_days` is left untouched on existing
/// rows.
#[utoipa::path(
    post,
    path = "/api/v1/leave/balances/allot",
    request_body = AllotLeave,
    responses(
        (status = 200, description = "Balances allotted", body = Object, example = json!({
            "message": "Allotted 2 leave type(s) for 3 employee(s)"
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn allot_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AllotLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.employee_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Select at least one employee to allot leaves"
        })));
    }
    if payload.allotments.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No leave days provided"
        })));
    }

    for employee_id in &payload.employee_ids {
        for allotment in &payload.allotments {
            sqlx::query(
                r#"
                INSERT INTO leave_balances (employee_id, leave_type_id, year, total_days, used_days)
                VALUES (?, ?, ?, ?, 0)
                ON DUPLICATE KEY UPDATE total_days = VALUES(total_days)
                "#,
            )
            .bind(employee_id)
            .bind(allotment.leave_type_id)
            .bind(payload.year)
            .bind(round2(allotment.total_days))
            .execute(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, employee_id, "Failed to allot leave balance");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!(
            "Allotted {} leave type(s) for {} employee(s)",
            payload.allotments.len(),
            payload.employee_ids.len()
        )
    })))
}
