//! In-memory stores
//!
//! Useful for tests and for embedding the API without a database. They
//! enforce the same uniqueness rules a database schema would.

use async_trait::async_trait;
use chrono::Utc;
use folio_core::{
    Content, ContentRepository, FolioError, RefreshToken, RefreshTokenStore, Result, User,
    UserStore,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Writable content repository preserving insertion order
pub struct MemoryRepository<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Content> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }
}

impl<T: Content> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Content> ContentRepository<T> for MemoryRepository<T> {
    async fn list(&self) -> Result<Vec<T>> {
        Ok(self.items.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<T>> {
        Ok(self.items.read().await.iter().find(|i| i.id() == id).cloned())
    }

    async fn create(&self, item: &T) -> Result<()> {
        let mut items = self.items.write().await;
        if items.iter().any(|i| i.id() == item.id()) {
            return Err(FolioError::Conflict(format!(
                "{} {}",
                T::COLLECTION,
                item.id()
            )));
        }
        items.push(item.clone());
        Ok(())
    }

    async fn update(&self, item: &T) -> Result<()> {
        let mut items = self.items.write().await;
        let slot = items
            .iter_mut()
            .find(|i| i.id() == item.id())
            .ok_or_else(|| FolioError::NotFound(format!("{} {}", T::COLLECTION, item.id())))?;
        *slot = item.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|i| i.id() != id);
        if items.len() == before {
            return Err(FolioError::NotFound(format!("{} {id}", T::COLLECTION)));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// In-memory user store with a unique email index
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(FolioError::Conflict(format!("email {}", user.email)));
        }
        if users.contains_key(&user.id) {
            return Err(FolioError::Conflict(format!("user {}", user.id)));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }
}

/// In-memory refresh token store keyed by JTI
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn create(&self, token: &RefreshToken) -> Result<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.jti) {
            return Err(FolioError::Conflict(format!("refresh token {}", token.jti)));
        }
        tokens.insert(token.jti.clone(), token.clone());
        Ok(())
    }

    async fn get_by_jti(&self, jti: &str) -> Result<Option<RefreshToken>> {
        Ok(self.tokens.read().await.get(jti).cloned())
    }

    async fn revoke(&self, jti: &str) -> Result<()> {
        if let Some(token) = self.tokens.write().await.get_mut(jti) {
            token.revoked_at.get_or_insert_with(Utc::now);
        }
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let now = Utc::now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - tokens.len()) as u64)
    }
}
