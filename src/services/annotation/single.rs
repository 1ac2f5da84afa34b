//! Single-item categorization.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::backend::AnnotationBackend;
use super::parser::parse_single_response;
use super::types::{AnnotationError, SingleAnnotation};
use crate::llm::prompts;
use crate::models::{
    AnnotationRecord, Category, FeedbackItem, Priority, Sentiment, DEFAULT_CONFIDENCE,
};

/// Output token budget for a single-item reply.
pub const SINGLE_MAX_TOKENS: u32 = 500;

/// Maximum keywords kept from a provider reply.
pub const MAX_KEYWORDS: usize = 5;

/// Annotates exactly one feedback item.
///
/// Unlike the batch path, an undecodable provider reply is an error here:
/// there is no useful degraded categorization of a single item.
pub struct SingleItemAnnotator {
    backend: AnnotationBackend,
}

impl SingleItemAnnotator {
    pub fn new(backend: AnnotationBackend) -> Self {
        Self { backend }
    }

    pub async fn annotate(&self, item: &FeedbackItem) -> Result<SingleAnnotation, AnnotationError> {
        match &self.backend {
            AnnotationBackend::Mock(generator) => Ok(generator.annotate_single(item)),
            AnnotationBackend::Live(provider) => {
                debug!("Categorizing {} via {}", item.id, provider.name());
                let raw = provider
                    .complete(&prompts::single_prompt(item), SINGLE_MAX_TOKENS)
                    .await?;
                let mut annotation =
                    parse_single_response(&raw).map_err(AnnotationError::into_provider_error)?;
                if let Some(keywords) = annotation.keywords.as_mut() {
                    keywords.truncate(MAX_KEYWORDS);
                }
                Ok(annotation)
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Apply a single-item annotation to `item`.
///
/// Category, sentiment and priority change only when the annotation carries
/// a non-empty, recognized label. The annotation record is replaced; any of
/// its fields missing from the annotation keep the previous record's value.
pub fn apply_single_annotation(
    item: &mut FeedbackItem,
    annotation: &SingleAnnotation,
    analyzed_at: DateTime<Utc>,
) {
    if let Some(label) = non_empty(annotation.category.as_deref()) {
        match Category::from_str(label) {
            Some(category) => item.category = category,
            None => warn!("Ignoring unknown category {:?} for {}", label, item.id),
        }
    }
    if let Some(label) = non_empty(annotation.sentiment.as_deref()) {
        match Sentiment::from_str(label) {
            Some(sentiment) => item.sentiment = sentiment,
            None => warn!("Ignoring unknown sentiment {:?} for {}", label, item.id),
        }
    }
    if let Some(label) = non_empty(annotation.priority.as_deref()) {
        match Priority::from_str(label) {
            Some(priority) => item.priority = priority,
            None => warn!("Ignoring unknown priority {:?} for {}", label, item.id),
        }
    }

    let previous = item.ai_analysis.take();
    let (prev_summary, prev_keywords, prev_category) = match previous {
        Some(record) => (record.summary, record.keywords, record.suggested_category),
        None => (None, Vec::new(), None),
    };

    item.ai_analysis = Some(AnnotationRecord {
        summary: non_empty(annotation.summary.as_deref())
            .map(str::to_string)
            .or(prev_summary),
        keywords: match &annotation.keywords {
            Some(keywords) if !keywords.is_empty() => keywords.clone(),
            _ => prev_keywords,
        },
        suggested_category: non_empty(annotation.category.as_deref())
            .map(str::to_string)
            .or(prev_category),
        confidence_score: DEFAULT_CONFIDENCE,
        analyzed_at,
    });
    item.updated_at = analyzed_at;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::llm::{CompletionProvider, LlmError};

    struct FixedReply(&'static str);

    #[async_trait]
    impl CompletionProvider for FixedReply {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
            assert_eq!(max_tokens, SINGLE_MAX_TOKENS);
            Ok(self.0.to_string())
        }
    }

    fn live(reply: &'static str) -> SingleItemAnnotator {
        SingleItemAnnotator::new(AnnotationBackend::live(Arc::new(FixedReply(reply))))
    }

    #[tokio::test]
    async fn test_live_reply_is_decoded_and_keywords_capped() {
        let annotator = live(
            r#"{"category":"Bug Report","sentiment":"negative","priority":"critical","keywords":["a","b","c","d","e","f","g"],"summary":"Checkout crashes."}"#,
        );
        let item = FeedbackItem::new("Checkout crash", "App dies on pay");
        let annotation = annotator.annotate(&item).await.unwrap();
        assert_eq!(annotation.category.as_deref(), Some("Bug Report"));
        assert_eq!(annotation.keywords.as_ref().unwrap().len(), MAX_KEYWORDS);
    }

    #[tokio::test]
    async fn test_undecodable_reply_is_provider_error() {
        let annotator = live("I think this is a bug report.");
        let item = FeedbackItem::new("Checkout crash", "");
        let err = annotator.annotate(&item).await.unwrap_err();
        assert!(matches!(err, AnnotationError::Provider(LlmError::Parse(_))));
    }

    #[tokio::test]
    async fn test_mock_single_uses_title_tokens() {
        let annotator = SingleItemAnnotator::new(AnnotationBackend::mock(Some(11)));
        let item = FeedbackItem::new("Add dark mode", "");
        let annotation = annotator.annotate(&item).await.unwrap();
        assert_eq!(
            annotation.keywords,
            Some(vec!["Add".to_string(), "dark".to_string(), "mode".to_string()])
        );
    }

    #[test]
    fn test_apply_overwrites_present_fields_only() {
        let mut item = FeedbackItem::new("Slow search", "");
        item.category = Category::Performance;
        item.sentiment = Sentiment::Negative;
        item.priority = Priority::High;
        item.ai_analysis = Some(AnnotationRecord {
            summary: Some("Search is slow.".to_string()),
            keywords: vec!["search".to_string()],
            suggested_category: Some("Performance".to_string()),
            confidence_score: 0.85,
            analyzed_at: Utc::now(),
        });

        let annotation = SingleAnnotation {
            category: None,
            sentiment: Some("mixed".to_string()),
            priority: Some("".to_string()),
            keywords: None,
            summary: Some("Search takes several seconds.".to_string()),
        };
        let now = Utc::now();
        apply_single_annotation(&mut item, &annotation, now);

        assert_eq!(item.category, Category::Performance);
        assert_eq!(item.sentiment, Sentiment::Mixed);
        assert_eq!(item.priority, Priority::High);
        let record = item.ai_analysis.unwrap();
        assert_eq!(record.summary.as_deref(), Some("Search takes several seconds."));
        assert_eq!(record.keywords, vec!["search"]);
        assert_eq!(record.suggested_category.as_deref(), Some("Performance"));
        assert_eq!(record.analyzed_at, now);
    }

    #[test]
    fn test_apply_ignores_unknown_labels() {
        let mut item = FeedbackItem::new("x", "");
        let annotation = SingleAnnotation {
            category: Some("Marketing".to_string()),
            priority: Some("urgent".to_string()),
            ..Default::default()
        };
        apply_single_annotation(&mut item, &annotation, Utc::now());
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.priority, Priority::Medium);
        // The raw suggestion is still recorded
        assert_eq!(
            item.ai_analysis.unwrap().suggested_category.as_deref(),
            Some("Marketing")
        );
    }
}
