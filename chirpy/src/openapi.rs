//! OpenAPI documentation for the HTTP API, served at `/api/openapi.json`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Session/refresh bearer tokens and the webhook API key.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer_auth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token from `/api/login` or `/api/refresh`:\n\n\
                            ```\nAuthorization: Bearer <token>\n```\n\n\
                            `/api/refresh` and `/api/revoke` take the refresh token in the same header instead.",
                        ))
                        .build(),
                ),
            );
            components.security_schemes.insert(
                "api_key".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Payment provider key, sent as `Authorization: ApiKey <key>`",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Chirpy API", description = "Users, sessions and chirps"),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::health::healthz,
        api::handlers::users::create_user,
        api::handlers::users::update_user,
        api::handlers::auth::login,
        api::handlers::auth::refresh,
        api::handlers::auth::revoke,
        api::handlers::chirps::create_chirp,
        api::handlers::chirps::list_chirps,
        api::handlers::chirps::get_chirp,
        api::handlers::chirps::delete_chirp,
        api::handlers::webhooks::polka_webhook,
        api::handlers::admin::reset,
    ),
    components(
        schemas(
            api::models::users::CredentialsRequest,
            api::models::users::UserResponse,
            api::models::auth::LoginResponse,
            api::models::auth::RefreshResponse,
            api::models::chirps::ChirpCreate,
            api::models::chirps::ChirpResponse,
            api::models::webhooks::PolkaWebhook,
            api::models::webhooks::PolkaWebhookData,
            api::models::admin::ResetResponse,
            crate::db::models::chirps::SortDirection,
        )
    ),
    tags(
        (name = "authentication", description = "Login and token management"),
        (name = "users", description = "Account registration and credentials"),
        (name = "chirps", description = "Posting and reading chirps"),
        (name = "webhooks", description = "Payment provider callbacks"),
        (name = "admin", description = "Development-only maintenance"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
