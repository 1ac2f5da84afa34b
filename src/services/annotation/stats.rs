//! Status aggregates over feedback items.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{FeedbackItem, FeedbackStatus};

/// Item counts, total and per status label. Recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatistics {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
}

impl AggregateStatistics {
    /// Count for one status, 0 when no item has it.
    pub fn count(&self, status: FeedbackStatus) -> u64 {
        self.by_status.get(status.as_str()).copied().unwrap_or(0)
    }
}

/// Group items by status and count them.
pub fn aggregate(items: &[FeedbackItem]) -> AggregateStatistics {
    let mut stats = AggregateStatistics::default();
    for item in items {
        *stats
            .by_status
            .entry(item.status.as_str().to_string())
            .or_insert(0) += 1;
        stats.total += 1;
    }
    stats
}
