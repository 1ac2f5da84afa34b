//! Repository layer for feedback persistence.
//!
//! The annotation pipeline only needs to look items up and write them back,
//! so the store is a small async trait. Two backends are provided: an
//! in-memory store and a JSON file store used by the CLI.

mod json_file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::FeedbackItem;

pub use json_file::JsonFileStore;
pub use memory::MemoryFeedbackStore;

/// Errors from store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Selection criteria for `FeedbackStore::find_many`.
///
/// Results are always ordered most-recent first; `limit` applies after
/// the id and owner filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackFilter {
    pub ids: Option<Vec<String>>,
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

impl FeedbackFilter {
    /// The `limit` most recently created items.
    pub fn recent(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Items whose id is in `ids`.
    pub fn by_ids(ids: Vec<String>) -> Self {
        Self {
            ids: Some(ids),
            ..Self::default()
        }
    }

    /// Items submitted by `user_id`, or every item when `None`.
    pub fn by_user(user_id: Option<String>) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    /// Whether `item` passes the id and owner criteria.
    pub fn matches(&self, item: &FeedbackItem) -> bool {
        if let Some(ref ids) = self.ids {
            if !ids.iter().any(|id| id == &item.id) {
                return false;
            }
        }
        if let Some(ref user_id) = self.user_id {
            if item.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        true
    }

    /// Filter, order and limit a set of items according to this filter.
    pub(crate) fn apply<'a>(
        &self,
        items: impl IntoIterator<Item = &'a FeedbackItem>,
    ) -> Vec<FeedbackItem> {
        let mut selected: Vec<FeedbackItem> = items
            .into_iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Persistence contract consumed by the annotation services.
///
/// Writes are last-write-wins per item; no cross-item transactions.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Find items matching a filter, most recent first.
    async fn find_many(&self, filter: &FeedbackFilter) -> Result<Vec<FeedbackItem>, StoreError>;

    /// Get a single item by id.
    async fn get(&self, id: &str) -> Result<Option<FeedbackItem>, StoreError>;

    /// Insert or replace an item.
    async fn save(&self, item: &FeedbackItem) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn item_at(title: &str, minutes_ago: i64, user: Option<&str>) -> FeedbackItem {
        let mut item = FeedbackItem::new(title, "");
        item.created_at = Utc::now() - Duration::minutes(minutes_ago);
        item.user_id = user.map(str::to_string);
        item
    }

    #[test]
    fn test_filter_orders_most_recent_first_and_limits() {
        let items = vec![
            item_at("old", 30, None),
            item_at("newest", 1, None),
            item_at("middle", 10, None),
        ];

        let selected = FeedbackFilter::recent(2).apply(&items);
        let titles: Vec<_> = selected.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["newest", "middle"]);
    }

    #[test]
    fn test_filter_by_ids_and_user() {
        let a = item_at("a", 1, Some("u1"));
        let b = item_at("b", 2, Some("u2"));
        let c = item_at("c", 3, None);
        let items = vec![a.clone(), b.clone(), c.clone()];

        let by_ids = FeedbackFilter::by_ids(vec![c.id.clone(), a.id.clone(), "missing".into()]);
        assert_eq!(by_ids.apply(&items).len(), 2);

        let by_user = FeedbackFilter::by_user(Some("u2".into()));
        let selected = by_user.apply(&items);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, b.id);

        assert_eq!(FeedbackFilter::by_user(None).apply(&items).len(), 3);
    }
}
