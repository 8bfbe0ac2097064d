use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::utils::error::AppError;

/// Name of the session cookie
pub const TOKEN_COOKIE: &str = "token";

/// Fixed session lifetime
const TOKEN_TTL_HOURS: i64 = 10;

/// JWT Claims carried in the session cookie.
///
/// The token is minted from a caller-supplied identity payload and is taken
/// at face value: `email` is the only required field, everything else is
/// flattened into `extra` unchanged. There is no account lookup behind this,
/// by contract of the /jwt route.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn jwt_secret() -> String {
    std::env::var("ACCESS_TOKEN_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

fn is_production() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v == "production")
        .unwrap_or(false)
}

// Generate the session token from an arbitrary identity payload
pub fn generate_token(identity: &Map<String, Value>) -> Result<String, AppError> {
    let email = identity
        .get("email")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::InvalidRequest("identity payload must contain an email".to_string())
        })?
        .to_string();

    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize;

    let mut extra = identity.clone();
    // Reserved claim names cannot be overridden by the payload
    extra.remove("email");
    extra.remove("iat");
    extra.remove("exp");
    extra.remove("jti");

    let claims = Claims {
        email,
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
        extra,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret().as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

// Verify the session token; expiry is checked by the default validation
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("unauthorized access".to_string()))
}

/// Ownership check: the email a route acts on must be the session's own.
/// Anything else is Forbidden, including emails that do not exist.
pub fn ensure_owner(claims: &Claims, email: &str) -> Result<(), AppError> {
    if claims.email == email {
        Ok(())
    } else {
        Err(AppError::Forbidden("Forbidden access".to_string()))
    }
}

/// Cookie carrying a freshly issued session token. Secure/SameSite depend on
/// APP_ENV: cross-site in production (frontend on another origin), strict in
/// development.
pub fn session_cookie(token: String) -> Cookie<'static> {
    let production = is_production();
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Strict
        })
        .max_age(CookieDuration::hours(TOKEN_TTL_HOURS))
        .finish()
}

/// Expired cookie with the same flag set, so browsers drop the session
pub fn clear_session_cookie() -> Cookie<'static> {
    let production = is_production();
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Strict
        })
        .finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(fields: Value) -> Map<String, Value> {
        fields.as_object().unwrap().clone()
    }

    #[test]
    fn test_token_round_trip_preserves_payload() {
        let payload = identity(serde_json::json!({
            "email": "a@x.com",
            "name": "Ana",
            "photo": "https://example.com/ana.png"
        }));

        let token = generate_token(&payload).unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.extra.get("name").unwrap(), "Ana");
        assert_eq!(
            claims.extra.get("photo").unwrap(),
            "https://example.com/ana.png"
        );
    }

    #[test]
    fn test_token_expires_in_ten_hours() {
        let payload = identity(serde_json::json!({ "email": "a@x.com" }));
        let token = generate_token(&payload).unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 10 * 3600);
    }

    #[test]
    fn test_payload_without_email_is_rejected() {
        let payload = identity(serde_json::json!({ "name": "nobody" }));
        let result = generate_token(&payload);
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_payload_cannot_override_expiry() {
        let payload = identity(serde_json::json!({
            "email": "a@x.com",
            "exp": 4102444800_u64
        }));
        let token = generate_token(&payload).unwrap();
        let claims = verify_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 10 * 3600);
        assert!(claims.extra.get("exp").is_none());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let payload = identity(serde_json::json!({ "email": "a@x.com" }));
        let token = generate_token(&payload).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('a') { 'b' } else { 'a' });

        assert!(matches!(
            verify_token(&tampered),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_ensure_owner_accepts_only_the_session_identity() {
        let payload = identity(serde_json::json!({ "email": "a@x.com" }));
        let token = generate_token(&payload).unwrap();
        let claims = verify_token(&token).unwrap();

        assert!(ensure_owner(&claims, "a@x.com").is_ok());
        assert!(matches!(
            ensure_owner(&claims, "b@x.com"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_owner(&claims, ""),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::hours(10)));
    }

    #[test]
    fn test_clear_cookie_empties_value() {
        let cookie = clear_session_cookie();
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "");
    }
}
