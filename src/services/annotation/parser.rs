//! Extraction of structured payloads from free-form provider replies.
//!
//! Models often wrap JSON in markdown code fences or surround it with prose.
//! The batch path never fails: an undecodable reply becomes a degraded
//! result carrying the first 300 characters of the reply as its summary.
//! The single-item and insight paths report decode failures.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::types::{AnnotationError, BatchAnnotationResult, InsightReport, SingleAnnotation};

/// Characters of raw reply kept as the summary of a degraded result.
pub const DEGRADED_SUMMARY_CHARS: usize = 300;

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?i:json)[ \t]*\r?\n(.*?)\r?\n?```").unwrap());

static ANY_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n`]*\r?\n(.*?)\r?\n?```").unwrap());

/// Select the payload from a reply: the first ```json block, else the first
/// fenced block of any kind, else the whole text.
pub fn strip_code_fence(text: &str) -> &str {
    JSON_FENCE
        .captures(text)
        .or_else(|| ANY_FENCE.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
}

/// Parse a batch analysis reply, degrading instead of failing.
pub fn parse_batch_response(raw: &str) -> BatchAnnotationResult {
    let payload = strip_code_fence(raw);
    match serde_json::from_str::<BatchAnnotationResult>(payload.trim()) {
        Ok(result) => result,
        Err(e) => {
            warn!("Failed to parse batch reply as JSON, using degraded result: {}", e);
            degraded_result(raw)
        }
    }
}

/// Result used when a batch reply cannot be decoded.
pub fn degraded_result(raw: &str) -> BatchAnnotationResult {
    BatchAnnotationResult {
        summary: raw.chars().take(DEGRADED_SUMMARY_CHARS).collect(),
        ..BatchAnnotationResult::default()
    }
}

/// Parse a single-item categorization reply.
pub fn parse_single_response(raw: &str) -> Result<SingleAnnotation, AnnotationError> {
    decode_object(raw)?.ok_or_else(|| AnnotationError::Parse("no JSON object in reply".to_string()))
}

/// Parse an insights reply. A reply with no JSON object at all yields an
/// empty report; a malformed object is an error.
pub fn parse_insights_response(raw: &str) -> Result<InsightReport, AnnotationError> {
    Ok(decode_object(raw)?.unwrap_or_default())
}

/// Decode a JSON object from a reply: fence-stripped text first, then the
/// outermost `{...}` span. `Ok(None)` means the reply contains no object.
fn decode_object<T: DeserializeOwned>(raw: &str) -> Result<Option<T>, AnnotationError> {
    let payload = strip_code_fence(raw).trim();
    let first_err = match serde_json::from_str::<T>(payload) {
        Ok(value) => return Ok(Some(value)),
        Err(e) => e,
    };

    match (payload.find('{'), payload.rfind('}')) {
        (Some(start), Some(end)) if start < end => serde_json::from_str::<T>(&payload[start..=end])
            .map(Some)
            .map_err(|e| AnnotationError::Parse(e.to_string())),
        _ if payload.contains('{') => Err(AnnotationError::Parse(first_err.to_string())),
        _ => Ok(None),
    }
}
