//! LLM integration for feedback annotation.
//!
//! `CompletionProvider` is the seam the annotation services call through;
//! `LlmClient` is the HTTP implementation.

mod client;
mod provider;

pub use client::{prompts, LlmClient, LlmConfig, LlmError, LlmProvider};
pub use provider::CompletionProvider;
