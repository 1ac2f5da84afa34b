//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod config_cmd;
mod feedback;
mod insights;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::Config;
use crate::repository::{FeedbackStore, JsonFileStore};
use crate::services::FeedbackAiService;

#[derive(Parser)]
#[command(name = "feedback-annotate")]
#[command(about = "AI-assisted annotation and insights for product feedback")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Feedback store file (overrides config; relative to the working directory)
    #[arg(long, global = true, env = "ANNOTATE_STORE")]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a batch of feedback and annotate each item
    Analyze {
        /// Feedback IDs (comma-separated; defaults to the most recent items)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
    },

    /// Categorize a single feedback item
    Categorize {
        /// Feedback ID
        id: String,
    },

    /// Generate insights from feedback statistics
    Insights {
        /// Only consider feedback submitted by this user
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show feedback statistics by status
    Stats {
        /// Only consider feedback submitted by this user
        #[arg(long)]
        owner: Option<String>,
    },

    /// Add a feedback item to the store
    Add {
        /// Short title
        title: String,
        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Submitting user
        #[arg(long)]
        user: Option<String>,
    },

    /// List stored feedback, most recent first
    List {
        /// Maximum items to show (0 = all)
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved configuration and annotation mode
    Config,
}

/// Everything a command needs, resolved once from config.
pub struct Context {
    pub config: Config,
    pub store: Arc<dyn FeedbackStore>,
    pub service: FeedbackAiService,
}

impl Context {
    fn new(config: Config) -> Self {
        let store_path = config.store_path();
        debug!("Using feedback store at {}", store_path.display());
        let store: Arc<dyn FeedbackStore> = Arc::new(JsonFileStore::new(store_path));
        let service =
            FeedbackAiService::new(&config.llm, store.clone()).with_batch_limit(config.batch_limit());
        Self {
            config,
            store,
            service,
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).await?;
    if let Some(store) = cli.store {
        config = config.with_store_override(&store, &std::env::current_dir()?);
    }
    let ctx = Context::new(config);

    match cli.command {
        Commands::Analyze { ids } => analyze::cmd_analyze(&ctx, &ids).await,
        Commands::Categorize { id } => analyze::cmd_categorize(&ctx, &id).await,
        Commands::Insights { owner } => insights::cmd_insights(&ctx, owner.as_deref()).await,
        Commands::Stats { owner } => insights::cmd_stats(&ctx, owner.as_deref()).await,
        Commands::Add {
            title,
            description,
            user,
        } => feedback::cmd_add(&ctx, title, description, user).await,
        Commands::List { limit, json } => feedback::cmd_list(&ctx, limit, json).await,
        Commands::Config => config_cmd::cmd_config_show(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_split_once_on_commas() {
        let cli = Cli::try_parse_from([
            "feedback-annotate",
            "analyze",
            "--ids",
            "a,b",
            "--ids",
            "c",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze { ids } => assert_eq!(ids, vec!["a", "b", "c"]),
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_store_flag_is_global() {
        let cli = Cli::try_parse_from(["feedback-annotate", "stats", "--store", "items.json"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("items.json")));
    }
}
