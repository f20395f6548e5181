//! JWT token generation and validation
//!
//! Access and refresh tokens are both HS256-signed, each with its own secret.
//! Access tokens are stateless; refresh tokens carry a random JTI that the
//! auth service tracks in the refresh token store.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use folio_core::config::{AuthConfig, ConfigError, MAX_TTL_SECS};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Random bytes in a refresh token JTI
pub const JTI_LEN: usize = 16;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - user ID
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - user ID
    pub sub: String,
    /// JWT ID - key of the refresh token store record
    pub jti: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token claims are missing or malformed")]
    MalformedClaims,

    #[error("Token lifetime of {0}s is out of range")]
    LifetimeOutOfRange(u64),

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

/// JWT configuration
///
/// Built once from [`AuthConfig`]; construction fails unless both secrets
/// are present and different.
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,
    /// Secret for signing refresh tokens
    pub refresh_secret: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
}

impl JwtConfig {
    pub fn from_auth_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let access_secret = config
            .access_secret
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("JWT_SECRET".to_string()))?;
        let refresh_secret = config
            .refresh_secret
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("JWT_REFRESH_SECRET".to_string()))?;

        if access_secret == refresh_secret {
            return Err(ConfigError::InvalidValue {
                key: "JWT_REFRESH_SECRET".to_string(),
                value: "<same as JWT_SECRET>".to_string(),
            });
        }

        check_ttl("ACCESS_TTL", config.access_ttl_secs)?;
        check_ttl("REFRESH_TTL", config.refresh_ttl_secs)?;

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        })
    }
}

fn check_ttl(key: &str, secs: u64) -> Result<(), ConfigError> {
    if (1..=MAX_TTL_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: secs.to_string(),
        })
    }
}

/// A freshly minted refresh token together with its store key
#[derive(Debug, Clone)]
pub struct RefreshGrant {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints and validates access and refresh tokens
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> u64 {
        self.access_ttl_secs
    }

    /// Generate an access token for `user_id`
    pub fn issue_access(&self, user_id: &str) -> Result<String, TokenError> {
        let now = unix_now()?;
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: expiry(now, self.access_ttl_secs)?,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(TokenError::EncodingError)
    }

    /// Generate a refresh token with a fresh random JTI
    pub fn issue_refresh(&self, user_id: &str) -> Result<RefreshGrant, TokenError> {
        let now = unix_now()?;
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            jti: generate_jti(),
            iat: now,
            exp: expiry(now, self.refresh_ttl_secs)?,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(TokenError::EncodingError)?;

        let expires_at = i64::try_from(claims.exp)
            .ok()
            .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0))
            .ok_or(TokenError::LifetimeOutOfRange(self.refresh_ttl_secs))?;

        Ok(RefreshGrant {
            token,
            jti: claims.jti,
            expires_at,
        })
    }

    /// Validate an access token and return its subject
    pub fn validate_access(&self, token: &str) -> Result<String, TokenError> {
        let claims: AccessClaims = decode_checked(token, &self.access_decoding, true)?;
        Ok(claims.sub)
    }

    /// Validate a refresh token and return its subject and JTI
    pub fn validate_refresh(&self, token: &str) -> Result<(String, String), TokenError> {
        let claims: RefreshClaims = decode_checked(token, &self.refresh_decoding, true)?;
        Ok((claims.sub, claims.jti))
    }

    /// Check only the signature and claim shape of a refresh token
    pub fn decode_refresh_ignoring_expiry(
        &self,
        token: &str,
    ) -> Result<(String, String), TokenError> {
        let claims: RefreshClaims = decode_checked(token, &self.refresh_decoding, false)?;
        Ok((claims.sub, claims.jti))
    }
}

fn decode_checked<T: DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
    validate_exp: bool,
) -> Result<T, TokenError> {
    // A header that does not parse is garbage, not a claims problem
    decode_header(token).map_err(|_| TokenError::InvalidToken)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = validate_exp;

    let data = decode::<T>(token, key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
        ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => TokenError::MalformedClaims,
        _ => TokenError::InvalidToken,
    })?;

    Ok(data.claims)
}

/// `now + ttl`, kept within what a signed `i64` timestamp can hold
fn expiry(now: u64, ttl_secs: u64) -> Result<u64, TokenError> {
    now.checked_add(ttl_secs)
        .filter(|exp| i64::try_from(*exp).is_ok())
        .ok_or(TokenError::LifetimeOutOfRange(ttl_secs))
}

fn unix_now() -> Result<u64, TokenError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// 128 random bits, URL-safe base64 without padding
pub fn generate_jti() -> String {
    let mut bytes = [0u8; JTI_LEN];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
