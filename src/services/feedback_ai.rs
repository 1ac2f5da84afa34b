//! Feedback AI service: the operations exposed to callers.
//!
//! Selects feedback from the store, runs it through the annotation pipeline
//! and shapes the responses. Every response reports the annotation mode so
//! callers can mark synthetic output.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::annotation::{
    aggregate, apply_single_annotation, AggregateStatistics, AnnotationBackend, AnnotationError,
    BatchAnnotationResult, BatchAnnotator, InsightGenerator, InsightReport, SingleAnnotation,
    SingleItemAnnotator,
};
use crate::llm::LlmConfig;
use crate::models::AnnotationMode;
use crate::repository::{FeedbackFilter, FeedbackStore};

/// Number of most recent items analyzed when no ids are given.
pub const DEFAULT_BATCH_LIMIT: usize = 50;

/// Response of `analyze_batch`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalysisResponse {
    #[serde(flatten)]
    pub result: BatchAnnotationResult,
    pub mode: AnnotationMode,
    pub items_analyzed: usize,
    pub analyzed_at: DateTime<Utc>,
}

/// Response of `annotate_single`.
#[derive(Debug, Clone, Serialize)]
pub struct SingleAnnotationResponse {
    #[serde(flatten)]
    pub annotation: SingleAnnotation,
    pub mode: AnnotationMode,
}

/// Response of `insights`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    #[serde(flatten)]
    pub report: InsightReport,
    pub stats: AggregateStatistics,
    pub mode: AnnotationMode,
    pub generated_at: DateTime<Utc>,
}

/// Entry point for batch analysis, single-item categorization and insights.
pub struct FeedbackAiService {
    store: Arc<dyn FeedbackStore>,
    backend: AnnotationBackend,
    batch: BatchAnnotator,
    single: SingleItemAnnotator,
    insights: InsightGenerator,
    batch_limit: usize,
}

impl FeedbackAiService {
    /// Build the service, choosing live or mock mode from `config`.
    pub fn new(config: &LlmConfig, store: Arc<dyn FeedbackStore>) -> Self {
        Self::with_backend(AnnotationBackend::from_config(config), store)
    }

    pub fn with_backend(backend: AnnotationBackend, store: Arc<dyn FeedbackStore>) -> Self {
        Self {
            batch: BatchAnnotator::new(backend.clone(), store.clone()),
            single: SingleItemAnnotator::new(backend.clone()),
            insights: InsightGenerator::new(backend.clone()),
            backend,
            store,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    /// Override how many recent items are analyzed when no ids are given.
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }

    pub fn mode(&self) -> AnnotationMode {
        self.backend.mode()
    }

    /// Analyze the items with the given ids, or the most recent items when
    /// `ids` is `None` or empty.
    pub async fn analyze_batch(
        &self,
        ids: Option<Vec<String>>,
    ) -> Result<BatchAnalysisResponse, AnnotationError> {
        let filter = match ids {
            Some(ids) if !ids.is_empty() => FeedbackFilter::by_ids(ids),
            _ => FeedbackFilter::recent(self.batch_limit),
        };
        let items = self.store.find_many(&filter).await?;
        if items.is_empty() {
            return Err(AnnotationError::EmptyBatch);
        }

        let analysis = self.batch.analyze_batch(items).await?;
        Ok(BatchAnalysisResponse {
            result: analysis.result,
            mode: analysis.mode,
            items_analyzed: analysis.items_analyzed,
            analyzed_at: analysis.analyzed_at,
        })
    }

    /// Categorize one item and persist the applied annotation.
    pub async fn annotate_single(
        &self,
        id: &str,
    ) -> Result<SingleAnnotationResponse, AnnotationError> {
        let mut item = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))?;

        let annotation = self.single.annotate(&item).await?;
        apply_single_annotation(&mut item, &annotation, Utc::now());
        self.store.save(&item).await?;
        info!("Categorized feedback {} ({} mode)", item.id, self.mode());

        Ok(SingleAnnotationResponse {
            annotation,
            mode: self.mode(),
        })
    }

    /// Status aggregates, optionally restricted to one submitting user.
    pub async fn statistics(
        &self,
        user_id: Option<&str>,
    ) -> Result<AggregateStatistics, AnnotationError> {
        let items = self
            .store
            .find_many(&FeedbackFilter::by_user(user_id.map(str::to_string)))
            .await?;
        Ok(aggregate(&items))
    }

    /// Aggregate statistics and generate insights from them.
    pub async fn insights(&self, user_id: Option<&str>) -> Result<InsightsResponse, AnnotationError> {
        let stats = self.statistics(user_id).await?;
        let report = self.insights.generate(&stats).await?;
        Ok(InsightsResponse {
            report,
            stats,
            mode: self.mode(),
            generated_at: Utc::now(),
        })
    }
}
