//! feedback-annotate - AI-assisted annotation for product feedback.
//!
//! Annotates batches of feedback items with sentiment, category, priority
//! and keywords through an LLM provider, or through an offline mock
//! generator when no provider is configured, and derives narrative insights
//! from aggregate statistics.

#![allow(clippy::should_implement_trait)]

pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod repository;
pub mod services;
