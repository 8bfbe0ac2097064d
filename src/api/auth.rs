use actix_web::{web, HttpResponse, ResponseError};
use serde_json::{Map, Value};

use crate::services::auth_service;

/// POST /jwt - mint a session cookie from the supplied identity payload.
/// The payload is not checked against any account store; whoever calls this
/// gets a token for whatever identity they claim. That trust boundary is part
/// of the route's contract.
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Auth",
    responses(
        (status = 200, description = "Session cookie set"),
        (status = 400, description = "Payload has no email")
    )
)]
pub async fn issue_token(payload: web::Json<Map<String, Value>>) -> HttpResponse {
    log::info!("🔐 POST /jwt");

    match auth_service::generate_token(&payload) {
        Ok(token) => HttpResponse::Ok()
            .cookie(auth_service::session_cookie(token))
            .json(serde_json::json!({ "success": true })),
        Err(e) => {
            log::warn!("❌ Token issue failed: {}", e);
            e.error_response()
        }
    }
}

/// POST /logout - clear the session cookie; always succeeds
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn logout() -> HttpResponse {
    log::info!("🔐 POST /logout");

    HttpResponse::Ok()
        .cookie(auth_service::clear_session_cookie())
        .json(serde_json::json!({ "success": true }))
}
