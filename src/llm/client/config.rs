//! Annotation provider configuration.
//!
//! Env vars: ANNOTATE_ENABLED, ANNOTATE_PROVIDER, ANNOTATE_MODEL,
//! ANNOTATE_ENDPOINT, ANNOTATE_API_KEY, ANNOTATE_TIMEOUT_SECS,
//! ANNOTATE_MOCK_SEED. Provider keys (ANTHROPIC_API_KEY, OPENAI_API_KEY)
//! are picked up when no explicit key is set.

use serde::{Deserialize, Serialize};

use crate::models::AnnotationMode;

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Messages API (default)
    #[default]
    Anthropic,
    /// OpenAI-compatible chat completions API (OpenAI, Groq, Together.ai, etc.)
    OpenAI,
}

impl prefer::FromValue for LlmProvider {
    fn from_value(value: &prefer::ConfigValue) -> prefer::Result<Self> {
        match value.as_str() {
            Some(s) => LlmProvider::from_str(s).ok_or_else(|| prefer::Error::ConversionError {
                key: String::new(),
                type_name: "LlmProvider".to_string(),
                source: format!("unknown provider: {}", s).into(),
            }),
            None => Err(prefer::Error::ConversionError {
                key: String::new(),
                type_name: "LlmProvider".to_string(),
                source: "expected string".into(),
            }),
        }
    }
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Some(Self::Anthropic),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            _ => None,
        }
    }

    /// Base URL used when no endpoint is configured.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAI => "https://api.openai.com",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::OpenAI => "gpt-4o-mini",
        }
    }

    /// Env var holding this provider's API key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// Configuration for the annotation provider.
///
/// The presence of an API key decides the annotation mode: without one the
/// pipeline runs against the offline mock generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct LlmConfig {
    /// Whether live annotation is allowed at all
    #[serde(default = "default_enabled")]
    #[prefer(default)]
    pub enabled: bool,
    /// Provider API flavor
    #[serde(default)]
    #[prefer(default)]
    pub provider: LlmProvider,
    /// API base URL (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model ID (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    #[prefer(default)]
    pub temperature: f32,
    /// HTTP timeout for a single provider call
    #[serde(default = "default_timeout_secs")]
    #[prefer(default)]
    pub timeout_secs: u64,
    /// Seed for the mock generator; entropy-seeded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_seed: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: LlmProvider::default(),
            endpoint: None,
            api_key: None,
            model: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            mock_seed: None,
        }
    }
}

impl LlmConfig {
    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Explicit ANNOTATE_* values always win. Without an explicit provider,
    /// the provider is auto-detected from whichever provider key is present.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("ANNOTATE_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        let explicit_provider = lookup("ANNOTATE_PROVIDER").and_then(|v| LlmProvider::from_str(&v));
        if let Some(provider) = explicit_provider {
            self.provider = provider;
        }

        if let Some(endpoint) = lookup("ANNOTATE_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(model) = lookup("ANNOTATE_MODEL") {
            self.model = Some(model);
        }
        if let Some(key) = lookup("ANNOTATE_API_KEY") {
            self.api_key = Some(key);
        }

        if self.api_key.is_none() {
            if explicit_provider.is_some() {
                self.api_key = lookup(self.provider.key_env_var());
            } else if let Some(key) = lookup(LlmProvider::Anthropic.key_env_var()) {
                self.provider = LlmProvider::Anthropic;
                self.api_key = Some(key);
            } else if let Some(key) = lookup(LlmProvider::OpenAI.key_env_var()) {
                self.provider = LlmProvider::OpenAI;
                self.api_key = Some(key);
            }
        }

        if let Some(n) = lookup("ANNOTATE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = n;
        }
        if let Some(seed) = lookup("ANNOTATE_MOCK_SEED").and_then(|v| v.parse().ok()) {
            self.mock_seed = Some(seed);
        }
        self
    }

    /// Whether a usable API key is configured.
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Mode the pipeline will run in with this config.
    pub fn mode(&self) -> AnnotationMode {
        if self.enabled && self.has_credentials() {
            AnnotationMode::Live
        } else {
            AnnotationMode::Mock
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Get the provider name for display.
    pub fn provider_name(&self) -> &'static str {
        match self.provider {
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::OpenAI => {
                let endpoint = self.endpoint();
                if endpoint.contains("groq.com") {
                    "Groq"
                } else if endpoint.contains("together.xyz") {
                    "Together.ai"
                } else {
                    "OpenAI"
                }
            }
        }
    }

    /// Human-readable explanation of why the pipeline is in mock mode.
    pub fn availability_hint(&self) -> String {
        if !self.enabled {
            "Live annotation is disabled (llm.enabled = false)".to_string()
        } else if !self.has_credentials() {
            format!(
                "{} API key not set. Set {} or ANNOTATE_API_KEY",
                self.provider_name(),
                self.provider.key_env_var()
            )
        } else {
            format!("{} API at {}", self.provider_name(), self.endpoint())
        }
    }

    /// Copy of this config with the API key masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.api_key = copy.api_key.map(|key| {
            let prefix: String = key.chars().take(4).collect();
            format!("{}…", prefix)
        });
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_is_mock() {
        let config = LlmConfig::default();
        assert!(config.enabled);
        assert!(!config.has_credentials());
        assert_eq!(config.mode(), AnnotationMode::Mock);
        assert_eq!(config.endpoint(), "https://api.anthropic.com");
        assert!(config.model().starts_with("claude"));
    }

    #[test]
    fn test_anthropic_key_enables_live_mode() {
        let config = LlmConfig::default().with_overrides_from(env(&[("ANTHROPIC_API_KEY", "sk-ant-123")]));
        assert_eq!(config.provider, LlmProvider::Anthropic);
        assert_eq!(config.mode(), AnnotationMode::Live);
    }

    #[test]
    fn test_openai_key_autodetects_provider() {
        let config = LlmConfig::default().with_overrides_from(env(&[("OPENAI_API_KEY", "sk-1")]));
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.endpoint(), "https://api.openai.com");
        assert_eq!(config.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_explicit_provider_wins_over_detection() {
        let config = LlmConfig::default().with_overrides_from(env(&[
            ("ANNOTATE_PROVIDER", "groq"),
            ("ANNOTATE_ENDPOINT", "https://api.groq.com/openai/"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
        ]));
        assert_eq!(config.provider, LlmProvider::OpenAI);
        // Only the provider's own key is consulted
        assert!(!config.has_credentials());
        assert_eq!(config.endpoint(), "https://api.groq.com/openai");
        assert_eq!(config.provider_name(), "Groq");
    }

    #[test]
    fn test_blank_key_or_disabled_stays_mock() {
        let blank = LlmConfig::default().with_overrides_from(env(&[("ANNOTATE_API_KEY", "  ")]));
        assert_eq!(blank.mode(), AnnotationMode::Mock);

        let disabled = LlmConfig::default().with_overrides_from(env(&[
            ("ANNOTATE_API_KEY", "sk"),
            ("ANNOTATE_ENABLED", "false"),
        ]));
        assert_eq!(disabled.mode(), AnnotationMode::Mock);
        assert!(disabled.availability_hint().contains("disabled"));
    }

    #[test]
    fn test_numeric_overrides() {
        let config = LlmConfig::default().with_overrides_from(env(&[
            ("ANNOTATE_TIMEOUT_SECS", "30"),
            ("ANNOTATE_MOCK_SEED", "42"),
            ("ANNOTATE_MODEL", "claude-3-5-haiku-20241022"),
        ]));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.mock_seed, Some(42));
        assert_eq!(config.model(), "claude-3-5-haiku-20241022");
    }

    #[test]
    fn test_redacted_hides_key() {
        let config = LlmConfig {
            api_key: Some("sk-ant-secret".to_string()),
            ..LlmConfig::default()
        };
        let shown = config.redacted();
        assert_eq!(shown.api_key.as_deref(), Some("sk-a…"));
    }
}
