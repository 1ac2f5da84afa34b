//! In-memory feedback store.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{FeedbackFilter, FeedbackStore, StoreError};
use crate::models::FeedbackItem;

/// Feedback store backed by a `Vec`, preserving insertion order.
///
/// Also counts `save` calls, which lets callers observe how many writes a
/// pipeline run performed.
#[derive(Default)]
pub struct MemoryFeedbackStore {
    items: RwLock<Vec<FeedbackItem>>,
    saves: AtomicUsize,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `items`.
    pub fn with_items(items: Vec<FeedbackItem>) -> Self {
        Self {
            items: RwLock::new(items),
            saves: AtomicUsize::new(0),
        }
    }

    /// Snapshot of all items in insertion order.
    pub async fn all(&self) -> Vec<FeedbackItem> {
        self.items.read().await.clone()
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedbackStore for MemoryFeedbackStore {
    async fn find_many(&self, filter: &FeedbackFilter) -> Result<Vec<FeedbackItem>, StoreError> {
        let items = self.items.read().await;
        Ok(filter.apply(items.iter()))
    }

    async fn get(&self, id: &str) -> Result<Option<FeedbackItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn save(&self, item: &FeedbackItem) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
