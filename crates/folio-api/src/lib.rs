//! Folio API - REST server for portfolio content
//!
//! Serves projects, skills, contacts and posts over HTTP. Writes are guarded
//! by JWT bearer tokens whenever a database backs the content; without one
//! the content is served read-only from JSON files.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use state::AppState;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

/// OpenAPI document for the auth and health endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::auth::register_handler,
        handlers::auth::login_handler,
        handlers::auth::refresh_handler,
        handlers::auth::logout_handler,
        handlers::auth::me_handler,
    ),
    components(schemas(
        handlers::health::HealthResponse,
        auth::service::RegisterRequest,
        auth::service::LoginRequest,
        auth::service::RefreshRequest,
        auth::service::LogoutRequest,
        auth::service::AuthResponse,
        auth::service::AccessTokenResponse,
        auth::service::UserInfo,
        error::ApiError,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Registration, login and token management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// CORS for the configured origins; `*` mirrors the request origin so
/// credentials stay allowed
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", routes::api_routes(&state))
        .layer(cors_layer(&state.config.server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
