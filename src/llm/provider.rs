//! Completion provider abstraction.

use async_trait::async_trait;

use super::client::LlmError;

/// A text-generation backend that turns a prompt into raw reply text.
///
/// The reply is opaque: callers must tolerate arbitrary text, including
/// replies that do not follow the requested JSON shape.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Send `prompt` and return the reply text.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError>;
}
