//! Authentication service layer
//!
//! Provides business logic for user registration, login, token refresh, and logout.
//! Storage is reached only through the [`UserStore`] and [`RefreshTokenStore`]
//! traits, so the same service runs on PostgreSQL or the in-memory stores.

use super::jwt::{JwtConfig, TokenError, TokenIssuer};
use super::password::{hash_password_async, verify_password_async, PasswordError, DUMMY_HASH};
use chrono::{DateTime, Utc};
use folio_core::config::{AuthConfig, ConfigError};
use folio_core::{FolioError, RefreshToken, RefreshTokenStore, User, UserStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Logout request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Authentication response with tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserInfo,
}

/// Response to a successful refresh; the refresh token itself is reused
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Public view of a user record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Tokens handed out by a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists")]
    UserExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Refresh token not found")]
    TokenNotFound,

    #[error("Refresh token has been revoked")]
    TokenRevoked,

    #[error(transparent)]
    Store(#[from] FolioError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Failed to issue token: {0}")]
    Token(#[source] TokenError),
}

/// Authentication service
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn RefreshTokenStore>,
    issuer: TokenIssuer,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        issuer: TokenIssuer,
    ) -> Self {
        Self {
            users,
            tokens,
            issuer,
        }
    }

    /// Build the service from auth configuration, validating the secrets
    pub fn from_config(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn RefreshTokenStore>,
        config: &AuthConfig,
    ) -> Result<Self, ConfigError> {
        let jwt = JwtConfig::from_auth_config(config)?;
        Ok(Self::new(users, tokens, TokenIssuer::new(&jwt)))
    }

    /// Access token lifetime, reported to clients as `expires_in`
    pub fn access_ttl_secs(&self) -> u64 {
        self.issuer.access_ttl_secs()
    }

    /// Register a new user
    ///
    /// # Arguments
    ///
    /// * `email` - Account email, matched exactly
    /// * `password` - Plaintext password, hashed before storage
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - Newly created user
    /// * `Err(AuthError::UserExists)` - If the email is already registered
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if self.users.get_by_email(email).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = hash_password_async(password.to_string()).await?;
        let user = User::new(Uuid::new_v4().to_string(), email.to_string(), password_hash);

        // The pre-check above is not atomic with the insert; the store's
        // uniqueness rejection covers the race.
        match self.users.create(&user).await {
            Ok(()) => {}
            Err(FolioError::Conflict(_)) => return Err(AuthError::UserExists),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with email and password
    ///
    /// # Arguments
    ///
    /// * `email` - Account email
    /// * `password` - Plaintext password
    ///
    /// # Returns
    ///
    /// * `Ok(LoginOutcome)` - User plus a fresh access and refresh token
    /// * `Err(AuthError::InvalidCredentials)` - Unknown email or wrong password
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let Some(user) = self.users.get_by_email(email).await? else {
            // Same Argon2 cost as a wrong password for a real account
            verify_password_async(password.to_string(), DUMMY_HASH.to_string()).await?;
            tracing::warn!("Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_async(password.to_string(), user.password_hash.clone()).await? {
            tracing::warn!(user_id = %user.id, "Login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.issuer.issue_access(&user.id).map_err(AuthError::Token)?;
        let grant = self.issuer.issue_refresh(&user.id).map_err(AuthError::Token)?;

        self.tokens
            .create(&RefreshToken::new(
                grant.jti,
                user.id.clone(),
                grant.expires_at,
            ))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token: grant.token,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token is not rotated and stays valid until it expires or
    /// is revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let (user_id, jti) = self
            .issuer
            .validate_refresh(refresh_token)
            .map_err(|_| AuthError::InvalidToken)?;

        let record = self
            .tokens
            .get_by_jti(&jti)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if record.is_revoked() {
            return Err(AuthError::TokenRevoked);
        }
        if record.is_expired_at(Utc::now()) {
            return Err(AuthError::ExpiredToken);
        }

        let access_token = self.issuer.issue_access(&user_id).map_err(AuthError::Token)?;

        tracing::debug!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke a refresh token
    ///
    /// Only the signature is checked, so an expired token can still be
    /// logged out.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let (user_id, jti) = self
            .issuer
            .decode_refresh_ignoring_expiry(refresh_token)
            .map_err(|_| AuthError::InvalidToken)?;

        self.tokens.revoke(&jti).await?;

        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Validate an access token and return the user ID it was issued to
    pub fn validate_access_token(&self, token: &str) -> Result<String, AuthError> {
        self.issuer.validate_access(token).map_err(|e| match e {
            TokenError::ExpiredToken => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }

    /// Look up the user behind an authenticated request
    pub async fn current_user(&self, user_id: &str) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}
