//! Domain models
//!
//! Content entities are plain serde structs shared by every storage backend.
//! Identity records back the authentication subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Content;

/// Portfolio project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub url: String,
}

impl Content for Project {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn missing_field(&self) -> Option<&'static str> {
        self.title.trim().is_empty().then_some("title")
    }
}

/// A skill with a numeric proficiency level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: i32,
    #[serde(default)]
    pub category: String,
}

impl Content for Skill {
    const COLLECTION: &'static str = "skills";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn missing_field(&self) -> Option<&'static str> {
        self.name.trim().is_empty().then_some("name")
    }
}

/// Contact channels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telegram: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
}

impl Content for Contact {
    const COLLECTION: &'static str = "contacts";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn missing_field(&self) -> Option<&'static str> {
        self.email.trim().is_empty().then_some("email")
    }
}

/// Blog post. `published_at` is kept as the client sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published_at: String,
}

impl Content for Post {
    const COLLECTION: &'static str = "posts";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn missing_field(&self) -> Option<&'static str> {
        self.title.trim().is_empty().then_some("title")
    }
}

/// User account
///
/// Immutable once registered. The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: String, email: String, password_hash: String) -> Self {
        Self {
            id,
            email,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Stored record of an issued refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub jti: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(jti: String, user_id: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            jti,
            user_id,
            expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
