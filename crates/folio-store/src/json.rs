//! Read-only JSON file repository
//!
//! Each collection lives in one file holding a JSON array. The file is read
//! on every call so edits on disk show up without a restart.

use async_trait::async_trait;
use folio_core::{Content, ContentRepository, FolioError, Result};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Content repository backed by a JSON array on disk
pub struct JsonFileRepository<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Content> JsonFileRepository<T> {
    /// Repository reading an explicit file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Repository reading `<dir>/<collection>.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", T::COLLECTION)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<T>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            FolioError::StorageError(format!("Failed to read {}: {e}", self.path.display()))
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            FolioError::StorageError(format!("Failed to parse {}: {e}", self.path.display()))
        })
    }

    fn read_only(&self) -> FolioError {
        FolioError::ReadOnly(format!("{} are served from a JSON file", T::COLLECTION))
    }
}

#[async_trait]
impl<T: Content> ContentRepository<T> for JsonFileRepository<T> {
    async fn list(&self) -> Result<Vec<T>> {
        self.read_all().await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<T>> {
        Ok(self.read_all().await?.into_iter().find(|item| item.id() == id))
    }

    async fn create(&self, _item: &T) -> Result<()> {
        Err(self.read_only())
    }

    async fn update(&self, _item: &T) -> Result<()> {
        Err(self.read_only())
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Err(self.read_only())
    }

    fn backend(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Project, Skill};

    fn write_projects(dir: &Path) {
        std::fs::write(
            dir.join("projects.json"),
            r#"[
                {"id": "p1", "title": "Folio", "description": "This site", "tags": ["rust"], "url": "https://example.com"},
                {"id": "p2", "title": "Other"}
            ]"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let dir = tempfile::tempdir().unwrap();
        write_projects(dir.path());

        let repo = JsonFileRepository::<Project>::in_dir(dir.path());
        assert!(repo.path().ends_with("projects.json"));

        let items = repo.list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].tags, vec!["rust".to_string()]);

        let found = repo.get_by_id("p2").await.unwrap().unwrap();
        assert_eq!(found.title, "Other");
        assert!(found.url.is_empty());

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_writes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_projects(dir.path());
        let repo = JsonFileRepository::<Project>::in_dir(dir.path());

        let project = Project {
            id: "p3".to_string(),
            title: "New".to_string(),
            ..Default::default()
        };

        assert!(matches!(repo.create(&project).await, Err(FolioError::ReadOnly(_))));
        assert!(matches!(repo.update(&project).await, Err(FolioError::ReadOnly(_))));
        assert!(matches!(repo.delete("p1").await, Err(FolioError::ReadOnly(_))));

        // file untouched
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::<Skill>::in_dir(dir.path());

        assert!(matches!(repo.list().await, Err(FolioError::StorageError(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("skills.json"), "{not json").unwrap();
        let repo = JsonFileRepository::<Skill>::in_dir(dir.path());

        let err = repo.list().await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
