//! Folio Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout Folio:
//! - Content models (projects, skills, contacts, posts)
//! - Identity records (users, refresh tokens)
//! - Repository and store traits implemented by the storage backends
//! - Common error types
//! - Configuration management

pub mod config;
pub mod models;

pub use config::{AppConfig, ConfigError};
pub use models::{Contact, Post, Project, RefreshToken, Skill, User};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Core error type shared by the storage layer and its callers
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    Conflict(String),

    #[error("Storage is read-only: {0}")]
    ReadOnly(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, FolioError>;

// ============================================================================
// Content
// ============================================================================

/// A portfolio content entity that can be listed, fetched and edited by id
pub trait Content: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used for file names, table names and routes
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Name of the first required field that is empty, if any
    fn missing_field(&self) -> Option<&'static str>;
}

// ============================================================================
// Traits
// ============================================================================

/// CRUD access to one content collection
#[async_trait]
pub trait ContentRepository<T: Content>: Send + Sync {
    /// List every item in the collection
    async fn list(&self) -> Result<Vec<T>>;

    /// Fetch a single item
    async fn get_by_id(&self, id: &str) -> Result<Option<T>>;

    /// Insert a new item
    async fn create(&self, item: &T) -> Result<()>;

    /// Replace an existing item
    async fn update(&self, item: &T) -> Result<()>;

    /// Remove an item
    async fn delete(&self, id: &str) -> Result<()>;

    /// Backend name for logging and health output
    fn backend(&self) -> &'static str;
}

/// Persistence for user accounts
///
/// Implementations must reject a second user with the same email with
/// [`FolioError::Conflict`] when they are able to detect it.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> Result<()>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;
}

/// Persistence for issued refresh tokens, keyed by JTI
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a new record. A duplicate JTI is a [`FolioError::Conflict`].
    async fn create(&self, token: &RefreshToken) -> Result<()>;

    async fn get_by_jti(&self, jti: &str) -> Result<Option<RefreshToken>>;

    /// Mark a token revoked. Revoking twice keeps the first timestamp;
    /// revoking an unknown JTI does nothing.
    async fn revoke(&self, jti: &str) -> Result<()>;

    /// Purge records whose expiry has passed, returning how many were removed
    async fn delete_expired(&self) -> Result<u64>;
}
