use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::services::auth_service::{self, Claims};
use crate::utils::error::AppError;

/// Session gate: protected handlers take `Claims` as an argument, which makes
/// the route fail with 401 before the handler body runs when the `token`
/// cookie is absent, tampered with, or expired. The decoded identity is then
/// available for ownership checks.
impl FromRequest for Claims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.cookie(auth_service::TOKEN_COOKIE) {
            Some(cookie) => auth_service::verify_token(cookie.value()).map_err(|e| {
                log::warn!("❌ Rejected session token on {}", req.path());
                e.into()
            }),
            None => {
                Err(AppError::Unauthorized("unauthorized access".to_string()).into())
            }
        };

        ready(result)
    }
}
