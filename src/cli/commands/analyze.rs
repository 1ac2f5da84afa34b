//! Batch analysis and single-item categorization commands.

use console::style;

use super::Context;
use crate::cli::helpers::print_json;
use crate::cli::icons::{dim_arrow, mode_badge, success};

/// Annotate a batch and print the analysis as JSON.
pub async fn cmd_analyze(ctx: &Context, ids: &[String]) -> anyhow::Result<()> {
    // clap has already split on commas
    let ids: Vec<String> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    let selection = if ids.is_empty() {
        format!("{} most recent", ctx.config.batch_limit)
    } else {
        format!("{} selected", ids.len())
    };
    eprintln!(
        "{} Analyzing {} feedback items {}",
        dim_arrow(),
        selection,
        mode_badge(ctx.service.mode())
    );

    let ids = if ids.is_empty() { None } else { Some(ids) };
    let response = ctx.service.analyze_batch(ids).await?;

    eprintln!(
        "{} Analyzed {} items {}",
        success(),
        style(response.items_analyzed).cyan(),
        mode_badge(response.mode)
    );
    print_json(&response)
}

/// Categorize one item and print the annotation as JSON.
pub async fn cmd_categorize(ctx: &Context, id: &str) -> anyhow::Result<()> {
    let response = ctx.service.annotate_single(id).await?;
    eprintln!(
        "{} Categorized {} {}",
        success(),
        style(id).cyan(),
        mode_badge(response.mode)
    );
    print_json(&response)
}
