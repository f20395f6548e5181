//! Authentication gate for content routes
//!
//! Reads pass through untouched. Every other method must carry a valid
//! `Authorization: Bearer <access token>` header; on success the caller's
//! identity is added to request extensions as [`AuthenticatedUser`].

use super::service::AuthService;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Authenticated user information extracted from an access token
///
/// Handlers behind the gate can read it with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// User's unique identifier (the token subject)
    pub user_id: String,
}

/// Gate rejections, all answered with 401
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    MalformedAuthHeader,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = StatusCode::UNAUTHORIZED;
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Methods that never need a token
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Split an Authorization header value into its bearer token
///
/// The value must be exactly two space-separated parts, the first being
/// the literal `Bearer`.
pub fn parse_bearer(value: &str) -> Result<&str, GateError> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(GateError::MalformedAuthHeader),
    }
}

/// Resolve the caller from request headers
pub fn authenticate(auth: &AuthService, headers: &HeaderMap) -> Result<AuthenticatedUser, GateError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(GateError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| GateError::MalformedAuthHeader)?;

    let token = parse_bearer(value)?;

    let user_id = auth.validate_access_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        GateError::InvalidOrExpiredToken
    })?;

    Ok(AuthenticatedUser { user_id })
}

/// Gate middleware for content routes
///
/// # Usage
///
/// ```ignore
/// use axum::{Router, routing::post, middleware};
/// use folio_api::auth::middleware::auth_gate;
///
/// let app = Router::new()
///     .route("/projects", post(create_project))
///     .layer(middleware::from_fn_with_state(auth_service, auth_gate));
/// ```
pub async fn auth_gate(
    State(auth): State<Arc<AuthService>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, GateError> {
    if is_safe_method(request.method()) {
        return Ok(next.run(request).await);
    }

    let user = authenticate(&auth, request.headers()).map_err(|e| {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            reason = %e,
            "Unauthenticated write rejected"
        );
        e
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
