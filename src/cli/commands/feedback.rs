//! Feedback store commands.

use console::style;

use super::Context;
use crate::cli::helpers::{print_json, truncate};
use crate::cli::icons::{dim_arrow, success, warn};
use crate::models::FeedbackItem;
use crate::repository::FeedbackFilter;

/// Add a feedback item to the store.
pub async fn cmd_add(
    ctx: &Context,
    title: String,
    description: String,
    user: Option<String>,
) -> anyhow::Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("Title must not be empty");
    }

    let mut item = FeedbackItem::new(title, description);
    item.user_id = user;
    ctx.store.save(&item).await?;

    eprintln!("{} Added feedback {}", success(), style(&item.id).cyan());
    eprintln!("  {} {}", dim_arrow(), item.title);
    Ok(())
}

/// List stored feedback, most recent first.
pub async fn cmd_list(ctx: &Context, limit: usize, json: bool) -> anyhow::Result<()> {
    let filter = FeedbackFilter {
        limit: (limit > 0).then_some(limit),
        ..Default::default()
    };
    let items = ctx.store.find_many(&filter).await?;

    if json {
        return print_json(&items);
    }

    if items.is_empty() {
        println!("{} No feedback stored yet", warn());
        return Ok(());
    }

    println!(
        "\n{:<36}  {:<11}  {:<10}  {:>5}  {}",
        style("ID").bold(),
        style("Status").bold(),
        style("Sentiment").bold(),
        style("Votes").bold(),
        style("Title").bold()
    );
    for item in &items {
        let analyzed = if item.ai_analysis.is_some() { "*" } else { " " };
        println!(
            "{:<36}  {:<11}  {:<10}  {:>5}  {}{}",
            item.id,
            item.status.as_str(),
            item.sentiment.as_str(),
            item.votes,
            analyzed,
            truncate(&item.title, 50)
        );
    }
    println!("\n{} {} items (* = annotated)", dim_arrow(), items.len());
    Ok(())
}
