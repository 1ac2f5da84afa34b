//! Types shared across the annotation services.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::llm::LlmError;
use crate::models::AnnotationMode;
use crate::repository::StoreError;

/// Per-item annotation as returned by the provider (or the mock generator).
///
/// Labels are kept as the raw strings the provider produced; they are mapped
/// onto typed labels only when merged back onto a `FeedbackItem`. Every
/// field decodes leniently so one oddly typed value cannot sink the reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemAnnotation {
    /// Position of the item within the analyzed batch.
    #[serde(rename = "feedbackId", deserialize_with = "lenient_index")]
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_label")]
    pub sentiment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_label")]
    pub suggested_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient_label")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub keywords: Vec<String>,
}

/// Structured outcome of a batch annotation call.
///
/// `item_analysis` may be shorter or longer than the batch; merge-back only
/// touches the overlapping prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchAnnotationResult {
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub insights: Vec<String>,
    #[serde(deserialize_with = "lenient_counts")]
    pub sentiment_distribution: BTreeMap<String, u64>,
    #[serde(deserialize_with = "lenient_items")]
    pub item_analysis: Vec<ItemAnnotation>,
    #[serde(deserialize_with = "lenient_strings")]
    pub recommendations: Vec<String>,
}

/// Annotation of a single item (category, sentiment, priority, keywords,
/// one-sentence summary). Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleAnnotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Narrative output of the insight generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightReport {
    #[serde(deserialize_with = "lenient_strings")]
    pub insights: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub trends: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub recommendations: Vec<String>,
}

/// Envelope returned by `BatchAnnotator::analyze_batch`.
#[derive(Debug, Clone)]
pub struct BatchAnalysis {
    pub result: BatchAnnotationResult,
    pub mode: AnnotationMode,
    /// Size of the analyzed batch.
    pub items_analyzed: usize,
    /// Number of items that received an annotation and were persisted.
    pub items_annotated: usize,
    pub analyzed_at: DateTime<Utc>,
}

/// Errors from the annotation pipeline.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("No feedback items found to analyze")]
    EmptyBatch,

    #[error("Feedback not found: {0}")]
    NotFound(String),

    #[error("Provider error: {0}")]
    Provider(#[from] LlmError),

    #[error("Could not decode provider reply: {0}")]
    Parse(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AnnotationError {
    /// Report a decode failure as a provider failure. Used where an
    /// unusable reply means the provider call itself failed.
    pub fn into_provider_error(self) -> Self {
        match self {
            Self::Parse(msg) => Self::Provider(LlmError::Parse(msg)),
            other => other,
        }
    }
}

// Lenient decoders for provider output. Models return nulls, numbers as
// strings and single values where lists are expected.

fn scalar_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn count_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_string(Value::deserialize(deserializer)?))
}

fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values.into_iter().filter_map(scalar_string).collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    })
}

fn lenient_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    Ok(count_value(&Value::deserialize(deserializer)?).unwrap_or(0) as usize)
}

fn lenient_counts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, u64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(label, value)| count_value(&value).map(|count| (label, count)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

/// Non-object entries become empty annotations so positions stay aligned.
fn lenient_items<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ItemAnnotation>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values
            .into_iter()
            .map(|value| serde_json::from_value(value).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}
