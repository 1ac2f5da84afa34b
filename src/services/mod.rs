//! Service layer for feedback annotation.
//!
//! This module contains domain logic separated from UI concerns.
//! Services can be used by the CLI or embedded in another host.

pub mod annotation;
mod feedback_ai;

pub use feedback_ai::{
    BatchAnalysisResponse, FeedbackAiService, InsightsResponse, SingleAnnotationResponse,
    DEFAULT_BATCH_LIMIT,
};
