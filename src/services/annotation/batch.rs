//! Batch annotation: one provider call for a whole batch, merged back onto
//! the items by position.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::backend::AnnotationBackend;
use super::parser::parse_batch_response;
use super::types::{AnnotationError, BatchAnalysis, BatchAnnotationResult};
use crate::llm::prompts;
use crate::models::{AnnotationRecord, FeedbackItem, Sentiment, DEFAULT_CONFIDENCE};
use crate::repository::FeedbackStore;

/// Output token budget for a batch reply.
pub const BATCH_MAX_TOKENS: u32 = 4000;

/// Write provider annotations onto `items`, aligned by position.
///
/// Only the first `min(items.len(), result.item_analysis.len())` items are
/// touched; the rest are left as they were. Each touched item gets a fresh
/// `AnnotationRecord` (replacing any previous one) and, when the provider
/// returned a recognized sentiment label, a new sentiment. Returns the
/// number of items updated.
pub fn merge_annotations(
    items: &mut [FeedbackItem],
    result: &BatchAnnotationResult,
    analyzed_at: DateTime<Utc>,
) -> usize {
    let mut merged = 0;
    for (item, annotation) in items.iter_mut().zip(&result.item_analysis) {
        item.ai_analysis = Some(AnnotationRecord {
            summary: Some(result.summary.clone()),
            keywords: annotation.keywords.clone(),
            suggested_category: annotation.suggested_category.clone(),
            confidence_score: DEFAULT_CONFIDENCE,
            analyzed_at,
        });

        if let Some(label) = annotation.sentiment.as_deref() {
            match Sentiment::from_str(label) {
                Some(sentiment) => item.sentiment = sentiment,
                None => warn!("Ignoring unknown sentiment {:?} for {}", label, item.id),
            }
        }

        item.updated_at = analyzed_at;
        merged += 1;
    }
    merged
}

/// Orchestrates batch annotation against the configured backend and
/// persists the merged items.
pub struct BatchAnnotator {
    backend: AnnotationBackend,
    store: Arc<dyn FeedbackStore>,
}

impl BatchAnnotator {
    pub fn new(backend: AnnotationBackend, store: Arc<dyn FeedbackStore>) -> Self {
        Self { backend, store }
    }

    pub fn backend(&self) -> &AnnotationBackend {
        &self.backend
    }

    /// Produce a batch result without touching the items or the store.
    pub async fn annotate(
        &self,
        items: &[FeedbackItem],
    ) -> Result<BatchAnnotationResult, AnnotationError> {
        if items.is_empty() {
            return Err(AnnotationError::EmptyBatch);
        }

        match &self.backend {
            AnnotationBackend::Mock(generator) => {
                info!("Using mock AI analysis for {} items", items.len());
                Ok(generator.generate(items))
            }
            AnnotationBackend::Live(provider) => {
                let prompt = prompts::batch_prompt(items);
                debug!("Sending {} items to {}", items.len(), provider.name());
                let raw = provider.complete(&prompt, BATCH_MAX_TOKENS).await?;
                Ok(parse_batch_response(&raw))
            }
        }
    }

    /// Annotate `items`, merge the result back by position, and save every
    /// updated item in batch order.
    ///
    /// Saves are not transactional: if one fails, the error is returned and
    /// the items saved before it stay saved.
    pub async fn analyze_batch(
        &self,
        mut items: Vec<FeedbackItem>,
    ) -> Result<BatchAnalysis, AnnotationError> {
        let mode = self.backend.mode();
        info!("Analyzing {} feedback items ({} mode)", items.len(), mode);

        let result = self.annotate(&items).await?;
        let analyzed_at = Utc::now();

        if result.item_analysis.len() != items.len() {
            warn!(
                "Provider returned {} item annotations for {} items; merging the overlap",
                result.item_analysis.len(),
                items.len()
            );
        }

        let merged = merge_annotations(&mut items, &result, analyzed_at);
        for item in items.iter().take(merged) {
            self.store.save(item).await?;
        }

        info!("Annotated {} of {} feedback items", merged, items.len());

        Ok(BatchAnalysis {
            result,
            mode,
            items_analyzed: items.len(),
            items_annotated: merged,
            analyzed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::llm::{CompletionProvider, LlmError};
    use crate::models::{AnnotationMode, FeedbackStatus};
    use crate::repository::{FeedbackFilter, MemoryFeedbackStore, StoreError};
    use crate::services::annotation::types::ItemAnnotation;

    struct ScriptedProvider {
        reply: Result<String, String>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(msg: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(msg.to_string()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(LlmError::Api)
        }
    }

    /// Store that rejects the save with the given 1-based attempt number.
    struct FailingStore {
        inner: MemoryFeedbackStore,
        fail_on: usize,
        attempts: AtomicUsize,
    }

    impl FailingStore {
        fn new(fail_on: usize) -> Arc<Self> {
            Arc::new(Self {
                inner: MemoryFeedbackStore::new(),
                fail_on,
                attempts: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl FeedbackStore for FailingStore {
        async fn find_many(&self, filter: &FeedbackFilter) -> Result<Vec<FeedbackItem>, StoreError> {
            self.inner.find_many(filter).await
        }

        async fn get(&self, id: &str) -> Result<Option<FeedbackItem>, StoreError> {
            self.inner.get(id).await
        }

        async fn save(&self, item: &FeedbackItem) -> Result<(), StoreError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt == self.fail_on {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.save(item).await
        }
    }

    fn batch(n: usize) -> Vec<FeedbackItem> {
        (0..n)
            .map(|i| FeedbackItem::new(format!("Item {} title", i), "desc"))
            .collect()
    }

    fn annotation(index: usize, sentiment: &str) -> ItemAnnotation {
        ItemAnnotation {
            index,
            sentiment: Some(sentiment.to_string()),
            suggested_category: Some("Bug Report".to_string()),
            priority: Some("high".to_string()),
            keywords: vec![format!("kw{}", index)],
        }
    }

    #[test]
    fn test_merge_truncates_to_shorter_side() {
        let mut items = batch(5);
        let original = items.clone();
        let result = BatchAnnotationResult {
            summary: "three of five".to_string(),
            item_analysis: (0..3).map(|i| annotation(i, "negative")).collect(),
            ..Default::default()
        };

        let now = Utc::now();
        assert_eq!(merge_annotations(&mut items, &result, now), 3);

        for item in &items[..3] {
            let record = item.ai_analysis.as_ref().unwrap();
            assert_eq!(record.summary.as_deref(), Some("three of five"));
            assert_eq!(record.suggested_category.as_deref(), Some("Bug Report"));
            assert_eq!(record.confidence_score, 0.85);
            assert_eq!(record.analyzed_at, now);
            assert_eq!(item.sentiment, Sentiment::Negative);
        }
        assert_eq!(items[0].ai_analysis.as_ref().unwrap().keywords, vec!["kw0"]);
        assert_eq!(&items[3..], &original[3..]);
    }

    #[test]
    fn test_merge_extra_annotations_are_ignored() {
        let mut items = batch(1);
        let result = BatchAnnotationResult {
            item_analysis: (0..4).map(|i| annotation(i, "positive")).collect(),
            ..Default::default()
        };
        assert_eq!(merge_annotations(&mut items, &result, Utc::now()), 1);
    }

    #[test]
    fn test_merge_keeps_sentiment_when_absent_or_unknown() {
        let mut items = batch(2);
        items[0].sentiment = Sentiment::Mixed;
        items[1].sentiment = Sentiment::Positive;
        let mut first = annotation(0, "x");
        first.sentiment = None;
        let second = annotation(1, "thrilled");
        let result = BatchAnnotationResult {
            item_analysis: vec![first, second],
            ..Default::default()
        };

        merge_annotations(&mut items, &result, Utc::now());
        assert_eq!(items[0].sentiment, Sentiment::Mixed);
        assert_eq!(items[1].sentiment, Sentiment::Positive);
        assert!(items[0].ai_analysis.is_some());
    }

    #[test]
    fn test_merge_replaces_previous_record() {
        let mut items = batch(1);
        items[0].ai_analysis = Some(AnnotationRecord {
            summary: Some("old".to_string()),
            keywords: vec!["old".to_string(), "stale".to_string()],
            suggested_category: Some("Design".to_string()),
            confidence_score: 0.2,
            analyzed_at: Utc::now(),
        });
        let mut ann = annotation(0, "neutral");
        ann.keywords.clear();
        ann.suggested_category = None;
        let result = BatchAnnotationResult {
            summary: "new".to_string(),
            item_analysis: vec![ann],
            ..Default::default()
        };

        merge_annotations(&mut items, &result, Utc::now());
        let record = items[0].ai_analysis.as_ref().unwrap();
        assert_eq!(record.summary.as_deref(), Some("new"));
        assert!(record.keywords.is_empty());
        assert!(record.suggested_category.is_none());
    }

    #[tokio::test]
    async fn test_empty_batch_never_calls_provider() {
        let provider = ScriptedProvider::replying("{}");
        let store = Arc::new(MemoryFeedbackStore::new());
        let annotator = BatchAnnotator::new(AnnotationBackend::live(provider.clone()), store.clone());

        let err = annotator.analyze_batch(Vec::new()).await.unwrap_err();
        assert!(matches!(err, AnnotationError::EmptyBatch));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_error_merges_nothing() {
        let provider = ScriptedProvider::failing("HTTP 401");
        let store = Arc::new(MemoryFeedbackStore::new());
        let annotator = BatchAnnotator::new(AnnotationBackend::live(provider.clone()), store.clone());

        let err = annotator.analyze_batch(batch(3)).await.unwrap_err();
        assert!(matches!(err, AnnotationError::Provider(LlmError::Api(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_live_reply_is_parsed_merged_and_saved() {
        let result = BatchAnnotationResult {
            summary: "Mostly bugs".to_string(),
            item_analysis: (0..3).map(|i| annotation(i, "negative")).collect(),
            ..Default::default()
        };
        let reply = format!("```json\n{}\n```", serde_json::to_string(&result).unwrap());
        let provider = ScriptedProvider::replying(&reply);
        let items = batch(5);
        let store = Arc::new(MemoryFeedbackStore::with_items(items.clone()));
        let annotator = BatchAnnotator::new(AnnotationBackend::live(provider.clone()), store.clone());

        let analysis = annotator.analyze_batch(items.clone()).await.unwrap();
        assert_eq!(analysis.mode, AnnotationMode::Live);
        assert_eq!(analysis.items_analyzed, 5);
        assert_eq!(analysis.items_annotated, 3);
        assert_eq!(analysis.result, result);
        assert_eq!(store.save_count(), 3);

        let stored = store.all().await;
        assert!(stored[..3].iter().all(|i| i.ai_analysis.is_some()));
        assert_eq!(&stored[3..], &items[3..]);
    }

    #[tokio::test]
    async fn test_unparseable_live_reply_is_degraded_success() {
        let provider = ScriptedProvider::replying("The feedback is mostly about dark mode.");
        let store = Arc::new(MemoryFeedbackStore::new());
        let annotator = BatchAnnotator::new(AnnotationBackend::live(provider), store.clone());

        let analysis = annotator.analyze_batch(batch(2)).await.unwrap();
        assert_eq!(analysis.result.summary, "The feedback is mostly about dark mode.");
        assert_eq!(analysis.items_annotated, 0);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_backend_annotates_every_item() {
        let store = Arc::new(MemoryFeedbackStore::new());
        let annotator = BatchAnnotator::new(AnnotationBackend::mock(Some(5)), store.clone());
        let items = vec![FeedbackItem::new("Add dark mode", "...")
            .with_status(FeedbackStatus::Open)
            .with_votes(24)];

        let analysis = annotator.analyze_batch(items).await.unwrap();
        assert_eq!(analysis.mode, AnnotationMode::Mock);
        assert_eq!(analysis.items_analyzed, 1);
        assert_eq!(analysis.result.item_analysis[0].keywords, vec!["Add", "dark", "mode"]);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_save_failure_stops_batch_and_keeps_earlier_saves() {
        let result = BatchAnnotationResult {
            summary: "four items".to_string(),
            item_analysis: (0..4).map(|i| annotation(i, "negative")).collect(),
            ..Default::default()
        };
        let reply = serde_json::to_string(&result).unwrap();
        let provider = ScriptedProvider::replying(&reply);
        let store = FailingStore::new(3);
        let annotator = BatchAnnotator::new(AnnotationBackend::live(provider), store.clone());
        let items = batch(4);

        let err = annotator.analyze_batch(items.clone()).await.unwrap_err();
        assert!(matches!(err, AnnotationError::Store(StoreError::Io(_))));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 3);

        for item in &items[..2] {
            let saved = store.inner.get(&item.id).await.unwrap().unwrap();
            assert!(saved.ai_analysis.is_some());
            assert_eq!(saved.sentiment, Sentiment::Negative);
        }
        for item in &items[2..] {
            assert!(store.inner.get(&item.id).await.unwrap().is_none());
        }
        assert_eq!(store.inner.save_count(), 2);
    }
}
