use actix_web::{HttpResponse, Responder, web};
use serde_json::Value;
use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::model::settings::PolicySettings;
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::settings_cache;

const UPDATABLE_FIELDS: &[&str] = &[
    "max_late_days",
    "late_policy_deduction_per_day",
    "late_policy_leave_type_id",
    "auto_clock_out_time",
];

/// Get policy settings (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Current settings", body = PolicySettings),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No settings row yet")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn get_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let settings = settings_cache::get(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match settings {
        Some(s) => Ok(HttpResponse::Ok().json(s)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Settings not found"
        }))),
    }
}

/// Update policy settings (Admin)
///
/// Partial update: only the provided fields change. The cached copy is
/// dropped so the next read sees the new values.
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = Object,
    responses(
        (status = 200, description = "Settings updated", body = Object, example = json!({
            "message": "Settings updated"
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No settings row yet")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let current = sqlx::query_as::<_, PolicySettings>(
        r#"
        SELECT id, max_late_days, late_policy_deduction_per_day,
               late_policy_leave_type_id, auto_clock_out_time
        FROM settings
        LIMIT 1
        "#,
    )
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(current) = current else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Settings not found"
        })));
    };

    let update = build_update_sql("settings", &body, UPDATABLE_FIELDS, "id", current.id as i64)?;

    execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to update settings");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    settings_cache::invalidate().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Settings updated"
    })))
}
