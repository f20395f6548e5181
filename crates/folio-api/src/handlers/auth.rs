//! Authentication API handlers
//!
//! Provides HTTP endpoints for registration, login, token refresh, logout
//! and the current user's profile.

use crate::auth::middleware::authenticate;
use crate::auth::service::{
    AccessTokenResponse, AuthResponse, LoginOutcome, LoginRequest, LogoutRequest, RefreshRequest,
    RegisterRequest, UserInfo,
};
use crate::auth::AuthService;
use crate::error::AppError;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

const TOKEN_TYPE: &str = "Bearer";

fn auth_response(auth: &AuthService, outcome: LoginOutcome) -> AuthResponse {
    AuthResponse {
        access_token: outcome.access_token,
        refresh_token: outcome.refresh_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: auth.access_ttl_secs(),
        user: outcome.user.into(),
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }
    Ok(())
}

fn require_refresh_token(token: &str) -> Result<(), AppError> {
    if token.trim().is_empty() {
        return Err(AppError::BadRequest("refresh_token is required".to_string()));
    }
    Ok(())
}

/// Register a new user account
///
/// Creates the user and logs them in, returning the same token pair as
/// `/login`.
///
/// # Responses
///
/// * `201 Created` - User registered, tokens issued
/// * `400 Bad Request` - Missing email or password
/// * `409 Conflict` - Email already registered
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 409, description = "User already exists", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn register_handler(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_credentials(&request.email, &request.password)?;

    auth.register(&request.email, &request.password).await?;
    let outcome = auth.login(&request.email, &request.password).await?;

    Ok((StatusCode::CREATED, Json(auth_response(&auth, outcome))))
}

/// Login with email and password
///
/// # Responses
///
/// * `200 OK` - Authentication successful, returns tokens
/// * `401 Unauthorized` - Invalid credentials
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ApiError),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_credentials(&request.email, &request.password)?;

    let outcome = auth.login(&request.email, &request.password).await?;

    Ok(Json(auth_response(&auth, outcome)))
}

/// Refresh access token
///
/// Exchanges a refresh token for a new access token. The refresh token is
/// not rotated.
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed successfully", body = AccessTokenResponse),
        (status = 400, description = "Missing refresh token", body = crate::error::ApiError),
        (status = 401, description = "Invalid, expired or revoked refresh token", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn refresh_handler(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_refresh_token(&request.refresh_token)?;

    let access_token = auth.refresh(&request.refresh_token).await?;

    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: auth.access_ttl_secs(),
    }))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    request_body = LogoutRequest,
    responses(
        (status = 204, description = "Logout successful"),
        (status = 400, description = "Missing refresh token", body = crate::error::ApiError),
        (status = 401, description = "Invalid refresh token", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    )
)]
pub async fn logout_handler(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<LogoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_refresh_token(&request.refresh_token)?;

    auth.logout(&request.refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get current user profile
///
/// GET requests bypass the content gate, so this handler checks the bearer
/// token itself.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user profile", body = UserInfo),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me_handler(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let caller =
        authenticate(&auth, &headers).map_err(|e| AppError::Unauthorized(e.to_string()))?;
    let user = auth.current_user(&caller.user_id).await?;

    Ok(Json(UserInfo::from(user)))
}
