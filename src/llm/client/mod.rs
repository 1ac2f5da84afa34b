//! LLM client for feedback annotation.
//!
//! Supports the Anthropic Messages API and OpenAI-compatible chat completion
//! endpoints.

mod config;
pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::provider::CompletionProvider;

pub use config::{LlmConfig, LlmProvider};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to the LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse the API envelope
    #[error("Parse error: {0}")]
    Parse(String),
    /// No API key configured
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
    /// LLM is disabled
    #[error("LLM is disabled")]
    Disabled,
}

/// Chat message shared by both API flavors.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for the configured annotation provider.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client. Fails when live annotation is disabled or no
    /// API key is configured.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        if !config.enabled {
            return Err(LlmError::Disabled);
        }
        if !config.has_credentials() {
            return Err(LlmError::MissingCredentials(config.availability_hint()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    async fn call_anthropic(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let request = AnthropicRequest {
            model: self.config.model(),
            max_tokens,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.config.endpoint());
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: AnthropicResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        body.content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| LlmError::Parse("Empty response from API".to_string()))
    }

    async fn call_openai(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let request = OpenAiRequest {
            model: self.config.model(),
            max_tokens,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint());
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let body: OpenAiResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Parse("Empty response from API".to_string()))
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    fn name(&self) -> &str {
        self.config.provider_name()
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        debug!(
            "Calling {} ({}) with {} prompt chars",
            self.config.provider_name(),
            self.config.model(),
            prompt.len()
        );
        match self.config.provider {
            LlmProvider::Anthropic => self.call_anthropic(prompt, max_tokens).await,
            LlmProvider::OpenAI => self.call_openai(prompt, max_tokens).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_credentials() {
        let result = LlmClient::new(LlmConfig::default());
        assert!(matches!(result, Err(LlmError::MissingCredentials(_))));

        let disabled = LlmConfig {
            enabled: false,
            api_key: Some("sk".to_string()),
            ..LlmConfig::default()
        };
        assert!(matches!(LlmClient::new(disabled), Err(LlmError::Disabled)));
    }

    #[test]
    fn test_client_builds_with_key() {
        let config = LlmConfig {
            api_key: Some("sk-ant-test".to_string()),
            ..LlmConfig::default()
        };
        let client = LlmClient::new(config).unwrap();
        assert_eq!(client.name(), "Anthropic");
        assert_eq!(client.api_key(), "sk-ant-test");
    }

    #[test]
    fn test_anthropic_envelope_skips_non_text_blocks() {
        let body: AnthropicResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking"},{"type":"text","text":"hello"}]}"#,
        )
        .unwrap();
        let text = body.content.into_iter().find_map(|b| b.text);
        assert_eq!(text.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        let config = LlmConfig {
            api_key: Some("sk".to_string()),
            endpoint: Some("http://127.0.0.1:9".to_string()),
            timeout_secs: 2,
            ..LlmConfig::default()
        };
        let client = LlmClient::new(config).unwrap();
        let err = client.complete("hi", 10).await.unwrap_err();
        assert!(matches!(err, LlmError::Connection(_)));
    }
}
