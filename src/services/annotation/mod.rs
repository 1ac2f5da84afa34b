//! Annotation pipeline.
//!
//! A backend (live provider or mock generator) is chosen once from
//! configuration. `BatchAnnotator` annotates a batch in one call and merges
//! the result back onto the items by position; `SingleItemAnnotator` handles
//! one item with a narrower schema; `InsightGenerator` turns status
//! aggregates into narrative insights.

mod backend;
mod batch;
mod insights;
mod mock;
mod parser;
mod single;
mod stats;
mod types;

pub use backend::AnnotationBackend;
pub use batch::{merge_annotations, BatchAnnotator, BATCH_MAX_TOKENS};
pub use insights::{InsightGenerator, INSIGHTS_MAX_TOKENS};
pub use mock::{sentiment_distribution, MockAnnotationGenerator, MOCK_CATEGORIES};
pub use parser::{
    degraded_result, parse_batch_response, parse_insights_response, parse_single_response,
    strip_code_fence, DEGRADED_SUMMARY_CHARS,
};
pub use single::{apply_single_annotation, SingleItemAnnotator, MAX_KEYWORDS, SINGLE_MAX_TOKENS};
pub use stats::{aggregate, AggregateStatistics};
pub use types::{
    AnnotationError, BatchAnalysis, BatchAnnotationResult, InsightReport, ItemAnnotation,
    SingleAnnotation,
};
