use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::finance::{FinanceRecord, FinanceStatus, FinanceType};
use crate::policy::clock;

#[derive(Deserialize, ToSchema)]
pub struct CreateFinanceRecord {
    pub employee_id: u64,
    #[schema(example = 50000.0)]
    pub amount: f64,
    #[schema(example = "salary", value_type = String)]
    #[serde(rename = "type")]
    pub record_type: FinanceType,
    pub description: Option<String>,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct FinanceQuery {
    pub employee_id: Option<u64>,
    #[schema(example = 2026)]
    pub year: Option<i32>,
    #[schema(example = 1)]
    pub month: Option<u32>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct AllocateSlips {
    pub employee_ids: Vec<u64>,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(Serialize, ToSchema)]
pub struct FinanceListResponse {
    pub data: Vec<FinanceRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[utoipa::path(
    post,
    path = "/api/v1/finance",
    request_body = CreateFinanceRecord,
    responses(
        (status = 201, description = "Finance record created"),
        (status = 400, description = "Duplicate salary for the month"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Finance"
)]
pub async fn create_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateFinanceRecord>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.month < 1 || payload.month > 12 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid month"
        })));
    }

    // one salary row per employee per month
    if payload.record_type == FinanceType::Salary {
        let existing = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM finance_records
            WHERE employee_id = ? AND month = ? AND year = ? AND type = ?
            "#,
        )
        .bind(payload.employee_id)
        .bind(payload.month)
        .bind(payload.year)
        .bind(FinanceType::Salary)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to check existing salary record");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

        if existing > 0 {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "This employee already has a salary allocated for this month"
            })));
        }
    }

    sqlx::query(
        r#"
        INSERT INTO finance_records
        (employee_id, amount, type, description, month, year, status, created_by)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.amount)
    .bind(payload.record_type)
    .bind(&payload.description)
    .bind(payload.month)
    .bind(payload.year)
    .bind(FinanceStatus::Pending)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create finance record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Finance record created successfully"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/finance",
    params(FinanceQuery),
    responses(
        (status = 200, body = FinanceListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Finance"
)]
pub async fn list_records(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<FinanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    enum FilterValue {
        U64(u64),
        I32(i32),
        U32(u32),
    }

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }
    if let Some(year) = query.year {
        where_sql.push_str(" AND year = ?");
        args.push(FilterValue::I32(year));
    }
    if let Some(month) = query.month {
        where_sql.push_str(" AND month = ?");
        args.push(FilterValue::U32(month));
    }

    let count_sql = format!("SELECT COUNT(*) FROM finance_records{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::I32(v) => count_q.bind(*v),
            FilterValue::U32(v) => count_q.bind(*v),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count finance records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, amount, type, description, month, year, status,
               paid_at, salary_slip_allocated, created_by
        FROM finance_records
        {}
        ORDER BY year DESC, month DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, FinanceRecord>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::I32(v) => data_q.bind(v),
            FilterValue::U32(v) => data_q.bind(v),
        };
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch finance records");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(FinanceListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Mark a record as paid, stamping the payment time.
#[utoipa::path(
    put,
    path = "/api/v1/finance/{record_id}/mark-paid",
    params(
        ("record_id", Path, description = "Finance record ID")
    ),
    responses(
        (status = 200, description = "Record marked paid"),
        (status = 404, description = "Record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Finance"
)]
pub async fn mark_paid(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let record_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE finance_records
        SET status = ?, paid_at = ?
        WHERE id = ?
        "#,
    )
    .bind(FinanceStatus::Paid)
    .bind(clock::local_now())
    .bind(record_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, record_id, "Failed to mark finance record paid");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Finance record not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Finance record marked as paid"
    })))
}

/// Flag the month's salary records of the selected employees as having a
/// salary slip available.
#[utoipa::path(
    put,
    path = "/api/v1/finance/allocate-slips",
    request_body = AllocateSlips,
    responses(
        (status = 200, description = "Slips allocated"),
        (status = 400, description = "Bad request")
    ),
    security(("bearer_auth" = [])),
    tag = "Finance"
)]
pub async fn allocate_slips(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AllocateSlips>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    if payload.employee_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Select at least one employee"
        })));
    }

    let placeholders = vec!["?"; payload.employee_ids.len()].join(", ");
    let sql = format!(
        r#"
        UPDATE finance_records
        SET salary_slip_allocated = TRUE
        WHERE employee_id IN ({}) AND month = ? AND year = ? AND type = ?
        "#,
        placeholders
    );

    let mut q = sqlx::query(&sql);
    for employee_id in &payload.employee_ids {
        q = q.bind(employee_id);
    }
    let result = q
        .bind(payload.month)
        .bind(payload.year)
        .bind(FinanceType::Salary)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to allocate salary slips");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!(
            "Salary slips allocated for {} employee(s)",
            payload.employee_ids.len()
        ),
        "updatedRecords": result.rows_affected()
    })))
}
