//! API route definitions

use crate::auth::{auth_gate, AuthService};
use crate::handlers::{auth, content::collection_routes};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use folio_core::{Contact, Post, Project, Skill};
use std::sync::Arc;

/// Create API v1 routes
///
/// Content routes are gated only when an auth service is configured;
/// without one the auth routes are not mounted at all.
pub fn api_routes(state: &AppState) -> Router<Arc<AppState>> {
    let content_routes = Router::new()
        .merge(collection_routes::<Project>())
        .merge(collection_routes::<Skill>())
        .merge(collection_routes::<Contact>())
        .merge(collection_routes::<Post>());

    match &state.auth {
        Some(auth_service) => Router::new()
            .merge(content_routes.layer(middleware::from_fn_with_state(
                auth_service.clone(),
                auth_gate,
            )))
            .nest("/auth", auth_routes(auth_service.clone())),
        None => content_routes,
    }
}

/// Public auth routes (the gate never applies here)
pub fn auth_routes(auth_service: Arc<AuthService>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/refresh", post(auth::refresh_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/me", get(auth::me_handler))
        .with_state(auth_service)
}
