//! Live/mock backend selection.

use std::sync::Arc;

use tracing::{info, warn};

use super::mock::MockAnnotationGenerator;
use crate::llm::{CompletionProvider, LlmClient, LlmConfig};
use crate::models::AnnotationMode;

/// Where annotations come from. Decided once, at construction, from
/// configuration; every service built on the same backend reports the same
/// mode.
#[derive(Clone)]
pub enum AnnotationBackend {
    Live(Arc<dyn CompletionProvider>),
    Mock(Arc<MockAnnotationGenerator>),
}

impl AnnotationBackend {
    /// Live backend when the config carries credentials, mock otherwise.
    pub fn from_config(config: &LlmConfig) -> Self {
        if config.mode() == AnnotationMode::Mock {
            info!(
                "Using mock AI annotation ({})",
                config.availability_hint()
            );
            return Self::mock(config.mock_seed);
        }

        match LlmClient::new(config.clone()) {
            Ok(client) => {
                info!(
                    "Using {} for AI annotation (model: {})",
                    config.provider_name(),
                    config.model()
                );
                Self::Live(Arc::new(client))
            }
            Err(e) => {
                warn!("Could not create LLM client, falling back to mock: {}", e);
                Self::mock(config.mock_seed)
            }
        }
    }

    pub fn live(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::Live(provider)
    }

    pub fn mock(seed: Option<u64>) -> Self {
        Self::Mock(Arc::new(MockAnnotationGenerator::from_seed(seed)))
    }

    pub fn mode(&self) -> AnnotationMode {
        match self {
            Self::Live(_) => AnnotationMode::Live,
            Self::Mock(_) => AnnotationMode::Mock,
        }
    }
}
