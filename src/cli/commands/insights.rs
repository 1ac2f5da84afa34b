//! Statistics and insight commands.

use console::style;

use super::Context;
use crate::cli::helpers::print_json;
use crate::cli::icons::{bullet, mode_badge};
use crate::models::FeedbackStatus;

/// Generate insights and print them as JSON.
pub async fn cmd_insights(ctx: &Context, owner: Option<&str>) -> anyhow::Result<()> {
    let response = ctx.service.insights(owner).await?;
    eprintln!(
        "{} {} {}",
        style("Insights").bold(),
        scope_label(owner),
        mode_badge(response.mode)
    );
    print_json(&response)
}

/// Print status counts.
pub async fn cmd_stats(ctx: &Context, owner: Option<&str>) -> anyhow::Result<()> {
    let stats = ctx.service.statistics(owner).await?;

    println!("\n{} {}", style("Feedback Statistics").bold(), scope_label(owner));
    println!("{}", "-".repeat(40));
    println!("  {:<14} {}", "Total", style(stats.total).cyan());
    for status in [
        FeedbackStatus::Open,
        FeedbackStatus::InProgress,
        FeedbackStatus::Closed,
        FeedbackStatus::Archived,
    ] {
        println!("  {} {:<12} {}", bullet(), status.as_str(), stats.count(status));
    }
    Ok(())
}

fn scope_label(owner: Option<&str>) -> String {
    match owner {
        Some(user) => style(format!("(user {})", user)).dim().to_string(),
        None => style("(all users)").dim().to_string(),
    }
}
