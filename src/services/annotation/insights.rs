//! Narrative insights from aggregate statistics.

use tracing::debug;

use super::backend::AnnotationBackend;
use super::parser::parse_insights_response;
use super::stats::AggregateStatistics;
use super::types::{AnnotationError, InsightReport};
use crate::llm::prompts;
use crate::models::FeedbackStatus;

/// Output token budget for an insights reply.
pub const INSIGHTS_MAX_TOKENS: u32 = 1000;

/// Turns status aggregates into insights, trends and recommendations.
pub struct InsightGenerator {
    backend: AnnotationBackend,
}

impl InsightGenerator {
    pub fn new(backend: AnnotationBackend) -> Self {
        Self { backend }
    }

    pub async fn generate(
        &self,
        stats: &AggregateStatistics,
    ) -> Result<InsightReport, AnnotationError> {
        match &self.backend {
            AnnotationBackend::Mock(generator) => Ok(generator.insights()),
            AnnotationBackend::Live(provider) => {
                let prompt = prompts::insights_prompt(
                    stats.total,
                    stats.count(FeedbackStatus::Open),
                    stats.count(FeedbackStatus::InProgress),
                    stats.count(FeedbackStatus::Closed),
                );
                debug!("Requesting insights from {}", provider.name());
                let raw = provider.complete(&prompt, INSIGHTS_MAX_TOKENS).await?;
                parse_insights_response(&raw).map_err(AnnotationError::into_provider_error)
            }
        }
    }
}
