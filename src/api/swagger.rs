use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Suggestify Service API",
        version = "1.0.0",
        description = "Product query and recommendation backend. \n\n**Authentication:** Protected routes read a signed session token from the http-only `token` cookie, issued by `POST /jwt`.",
    ),
    paths(
        crate::api::auth::issue_token,
        crate::api::auth::logout,
        crate::api::health::health_check,
        crate::api::queries::search_queries,
        crate::api::queries::home_queries,
        crate::api::recommendations::add_recommendation,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Session cookie issuance and teardown."),
        (name = "Health", description = "Liveness and store connectivity."),
        (name = "Queries", description = "Product queries: submission, search, listings."),
        (name = "Recommendations", description = "Per-person recommendations attached to queries."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
            );
        }
    }
}
