//! API error handling

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_core::FolioError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    ReadOnly(String),
    Internal(String),
    Database(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ApiError::unauthorized(msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::ReadOnly(msg) => (
                StatusCode::METHOD_NOT_ALLOWED,
                ApiError::new("READ_ONLY", "Content storage is read-only").with_details(msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal_error().with_details(msg),
            ),
            AppError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("DATABASE_ERROR", "Database operation failed").with_details(msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<FolioError> for AppError {
    fn from(err: FolioError) -> Self {
        match err {
            FolioError::NotFound(msg) => AppError::NotFound(msg),
            FolioError::Conflict(msg) => AppError::Conflict(msg),
            FolioError::ReadOnly(msg) => AppError::ReadOnly(msg),
            FolioError::DatabaseError(msg) => AppError::Database(msg),
            FolioError::StorageError(msg) => AppError::Internal(format!("Storage error: {msg}")),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserExists => AppError::Conflict(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::TokenNotFound
            | AuthError::TokenRevoked => AppError::Unauthorized(err.to_string()),
            AuthError::Store(e) => e.into(),
            AuthError::Password(e) => AppError::Internal(e.to_string()),
            AuthError::Token(e) => AppError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_folio_error_status_codes() {
        assert_eq!(
            status_of(FolioError::NotFound("projects p1".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(FolioError::Conflict("projects p1".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(FolioError::ReadOnly("projects".into()).into()),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            status_of(FolioError::StorageError("disk".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(FolioError::DatabaseError("down".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(status_of(AuthError::UserExists.into()), StatusCode::CONFLICT);
        for err in [
            AuthError::InvalidCredentials,
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::TokenNotFound,
            AuthError::TokenRevoked,
        ] {
            assert_eq!(status_of(err.into()), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(
            status_of(AuthError::Store(FolioError::DatabaseError("down".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_serialization() {
        let json = serde_json::to_value(ApiError::not_found("projects p1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "projects p1 not found");
        assert!(json.get("details").is_none());

        let json =
            serde_json::to_value(ApiError::new("READ_ONLY", "read-only").with_details("x")).unwrap();
        assert_eq!(json["details"], "x");
    }
}
