//! Folio Configuration Management
//!
//! Handles configuration from environment variables and TOML files with
//! sensible defaults for development. Configuration is built once at startup
//! and passed by reference afterwards.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database connection
    pub database: DatabaseConfig,

    /// Flat-file content location
    pub content: ContentConfig,

    /// Token signing and lifetimes
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(&lookup)?;
        Ok(config)
    }

    fn apply_lookup<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "API_PORT".to_string(),
                value: port,
            })?;
        }

        // CORS origins from environment variable (comma-separated)
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // PostgreSQL
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(size) = lookup("DATABASE_POOL_SIZE") {
            self.database.pool_size = size.parse().map_err(|_| ConfigError::InvalidValue {
                key: "DATABASE_POOL_SIZE".to_string(),
                value: size,
            })?;
        }

        // Flat files
        if let Some(dir) = lookup("CONTENT_DIR") {
            self.content.data_dir = PathBuf::from(dir);
        }

        // Auth
        if let Some(secret) = lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            self.auth.access_secret = Some(secret);
        }
        if let Some(secret) = lookup("JWT_REFRESH_SECRET").filter(|s| !s.is_empty()) {
            self.auth.refresh_secret = Some(secret);
        }
        if let Some(ttl) = lookup("ACCESS_TTL") {
            self.auth.access_ttl_secs = parse_duration_secs("ACCESS_TTL", &ttl)?;
        }
        if let Some(ttl) = lookup("REFRESH_TTL") {
            self.auth.refresh_ttl_secs = parse_duration_secs("REFRESH_TTL", &ttl)?;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.json_format = format.eq_ignore_ascii_case("json");
        }

        Ok(())
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_lookup(&|key: &str| std::env::var(key).ok())?;
        Ok(self)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed origins for CORS ("*" mirrors any origin)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Without it content is served from JSON files.
    pub url: Option<String>,

    /// PostgreSQL connection pool size
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 5,
        }
    }
}

/// Flat-file content configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory holding `projects.json`, `skills.json`, `contacts.json`, `posts.json`
    pub data_dir: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Token signing configuration
///
/// Secrets have no defaults: without both, authentication stays disabled.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub access_secret: Option<String>,

    /// HMAC secret for refresh tokens (must differ from the access secret)
    pub refresh_secret: Option<String>,

    /// Access token lifetime in seconds (default: 15 minutes)
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds (default: 7 days)
    pub refresh_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: None,
            refresh_secret: None,
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl AuthConfig {
    /// Both signing secrets are present
    pub fn is_configured(&self) -> bool {
        self.access_secret.is_some() && self.refresh_secret.is_some()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &self.access_secret.as_ref().map(|_| "<redacted>"))
            .field("refresh_secret", &self.refresh_secret.as_ref().map(|_| "<redacted>"))
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Longest accepted token lifetime (ten years)
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Parse a lifetime given as plain seconds or with an `s`, `m`, `h` or `d` suffix
pub fn parse_duration_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let (digits, multiplier) = match trimmed.char_indices().last() {
        Some((idx, 's')) => (&trimmed[..idx], 1),
        Some((idx, 'm')) => (&trimmed[..idx], 60),
        Some((idx, 'h')) => (&trimmed[..idx], 60 * 60),
        Some((idx, 'd')) => (&trimmed[..idx], 24 * 60 * 60),
        Some(_) => (trimmed, 1),
        None => return Err(invalid()),
    };

    let amount: u64 = digits.parse().map_err(|_| invalid())?;
    match amount.checked_mul(multiplier) {
        Some(secs) if (1..=MAX_TTL_SECS).contains(&secs) => Ok(secs),
        _ => Err(invalid()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
