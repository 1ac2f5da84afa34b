//! Configuration management for feedback-annotate using the prefer crate.
//!
//! Settings come from an optional TOML file with environment overrides on
//! top. The resolved value is handed to the services at construction; nothing
//! below the CLI reads the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::llm::LlmConfig;
use crate::services::DEFAULT_BATCH_LIMIT;

/// Application name used for config discovery.
pub const APP_NAME: &str = "feedback-annotate";

/// Default store file name under the data directory.
pub const DEFAULT_STORE_FILENAME: &str = "feedback.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn default_batch_limit() -> u32 {
    DEFAULT_BATCH_LIMIT as u32
}

/// Configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Feedback store file. Relative paths resolve against the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,
    /// Most recent items analyzed when no ids are given.
    #[serde(default = "default_batch_limit")]
    #[prefer(default)]
    pub batch_limit: u32,
    #[serde(default)]
    #[prefer(default)]
    pub llm: LlmConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            batch_limit: default_batch_limit(),
            llm: LlmConfig::default(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist and parse. Otherwise prefer discovers a
    /// `feedback-annotate` config file in the standard locations; defaults
    /// apply when none is found or it cannot be read. Environment overrides
    /// are applied last.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load_from_path(path).await?,
            None => Self::discover().await,
        };
        Ok(config.with_env_overrides())
    }

    /// Load the config file prefer discovers for this application.
    async fn discover() -> Self {
        match prefer::load(APP_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(config) => config,
                    Err(e) => {
                        warn!("Ignoring config file: {}", e);
                        Self::default()
                    }
                },
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific TOML file.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let mut config = Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// The store location is not overridden here; the CLI owns
    /// `--store` / `ANNOTATE_STORE` (see `with_store_override`).
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(n) = lookup("ANNOTATE_BATCH_LIMIT").and_then(|v| v.parse().ok()) {
            self.batch_limit = n;
        }
        self.llm = self.llm.with_overrides_from(&lookup);
        self
    }

    /// Point the store at `path`, resolving a relative path against `cwd`
    /// rather than the config file's directory.
    pub fn with_store_override(mut self, path: &Path, cwd: &Path) -> Self {
        let resolved = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
        self.store_path = Some(resolved.to_string_lossy().into_owned());
        self
    }

    /// Base directory for resolving relative paths: the config file's
    /// directory when loaded from a file.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolved feedback store path.
    ///
    /// Falls back to `<data dir>/feedback-annotate/feedback.json`, or the
    /// working directory when no data dir is known.
    pub fn store_path(&self) -> PathBuf {
        match self.store_path.as_deref().map(Path::new) {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => match self.base_dir() {
                Some(base) => base.join(path),
                None => path.to_path_buf(),
            },
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_NAME))
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_STORE_FILENAME),
        }
    }

    /// Batch limit as a count.
    pub fn batch_limit(&self) -> usize {
        self.batch_limit as usize
    }
}
