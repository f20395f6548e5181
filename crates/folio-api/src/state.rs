//! Application state management

use crate::auth::AuthService;
use folio_core::config::AppConfig;
use folio_core::{Contact, Content, ContentRepository, Post, Project, Skill};
use folio_store::{JsonFileRepository, MemoryRepository, PgStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// One repository per content collection
#[derive(Clone)]
pub struct ContentStores {
    pub projects: Arc<dyn ContentRepository<Project>>,
    pub skills: Arc<dyn ContentRepository<Skill>>,
    pub contacts: Arc<dyn ContentRepository<Contact>>,
    pub posts: Arc<dyn ContentRepository<Post>>,
}

impl ContentStores {
    /// Read-only JSON files under `dir`
    pub fn json(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            projects: Arc::new(JsonFileRepository::<Project>::in_dir(dir)),
            skills: Arc::new(JsonFileRepository::<Skill>::in_dir(dir)),
            contacts: Arc::new(JsonFileRepository::<Contact>::in_dir(dir)),
            posts: Arc::new(JsonFileRepository::<Post>::in_dir(dir)),
        }
    }

    /// PostgreSQL tables sharing one pool
    pub fn postgres(store: &PgStore) -> Self {
        Self {
            projects: Arc::new(store.clone()),
            skills: Arc::new(store.clone()),
            contacts: Arc::new(store.clone()),
            posts: Arc::new(store.clone()),
        }
    }

    /// Empty in-memory collections
    pub fn memory() -> Self {
        Self {
            projects: Arc::new(MemoryRepository::<Project>::new()),
            skills: Arc::new(MemoryRepository::<Skill>::new()),
            contacts: Arc::new(MemoryRepository::<Contact>::new()),
            posts: Arc::new(MemoryRepository::<Post>::new()),
        }
    }

    /// Name of the backend serving the collections
    pub fn backend(&self) -> &'static str {
        self.projects.backend()
    }
}

/// Selects the repository for a content type
pub trait ContentSource<T: Content> {
    fn repository(&self) -> Arc<dyn ContentRepository<T>>;
}

macro_rules! content_source {
    ($ty:ty, $field:ident) => {
        impl ContentSource<$ty> for AppState {
            fn repository(&self) -> Arc<dyn ContentRepository<$ty>> {
                self.content.$field.clone()
            }
        }
    };
}

content_source!(Project, projects);
content_source!(Skill, skills);
content_source!(Contact, contacts);
content_source!(Post, posts);

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Content repositories
    pub content: ContentStores,
    /// Auth service; `None` when running without a database
    pub auth: Option<Arc<AuthService>>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: AppConfig, content: ContentStores, auth: Option<Arc<AuthService>>) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            content,
            auth,
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!(ContentStores::memory().backend(), "memory");
        assert_eq!(ContentStores::json("data").backend(), "json");
    }

    #[tokio::test]
    async fn test_content_source_selects_collection() {
        let state = AppState::new(AppConfig::default(), ContentStores::memory(), None);

        let projects: Arc<dyn ContentRepository<Project>> = state.repository();
        projects
            .create(&Project {
                id: "p1".to_string(),
                title: "Folio".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let posts: Arc<dyn ContentRepository<Post>> = state.repository();
        assert!(posts.list().await.unwrap().is_empty());
        assert_eq!(state.content.projects.list().await.unwrap().len(), 1);
        assert!(!state.auth_enabled());
    }
}
