use actix_web::error::ErrorInternalServerError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

use crate::auth::auth::{AuthUser, bearer_token};
use crate::config::Config;

/// Guard for the protected scope: resolves the bearer token into an
/// `AuthUser` and stashes it in the request extensions, or answers 401.
pub async fn auth_middleware(
    mut req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| ErrorInternalServerError("App config missing"))?;

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let auth_user = match bearer_token(header) {
        None => {
            let resp = HttpResponse::Unauthorized()
                .json(json!({"error": "Missing or malformed Authorization header"}));
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
        Some(token) => match AuthUser::from_token(token, &config.jwt_secret) {
            Ok(user) => user,
            Err(reason) => {
                let resp = HttpResponse::Unauthorized().json(json!({"error": reason}));
                return Ok(req.into_response(resp.map_into_boxed_body()));
            }
        },
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
