//! Feedback store persisted as a JSON array on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{FeedbackFilter, FeedbackStore, StoreError};
use crate::models::FeedbackItem;

/// File-backed store. The whole file is re-read on every call and rewritten
/// on every save; a missing file is treated as an empty store.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<FeedbackItem>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, items: &[FeedbackItem]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(items)?;
        // Write-then-rename so readers never see a truncated file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for JsonFileStore {
    async fn find_many(&self, filter: &FeedbackFilter) -> Result<Vec<FeedbackItem>, StoreError> {
        let items = self.load().await?;
        Ok(filter.apply(items.iter()))
    }

    async fn get(&self, id: &str) -> Result<Option<FeedbackItem>, StoreError> {
        let items = self.load().await?;
        Ok(items.into_iter().find(|item| item.id == id))
    }

    async fn save(&self, item: &FeedbackItem) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        self.store(&items).await?;
        debug!("Saved feedback {} to {}", item.id, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("feedback.json"));
        let all = store.find_many(&FeedbackFilter::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_save_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("feedback.json");
        let store = JsonFileStore::new(&path);

        let mut item = FeedbackItem::new("Slow dashboard", "Takes 10s to load").with_votes(7);
        store.save(&item).await.unwrap();
        item.votes = 8;
        store.save(&item).await.unwrap();

        let reopened = JsonFileStore::new(&path);
        let all = reopened.find_many(&FeedbackFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].votes, 8);
        assert_eq!(reopened.get(&item.id).await.unwrap().unwrap().title, "Slow dashboard");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get("x").await,
            Err(StoreError::Serialization(_))
        ));
    }
}
