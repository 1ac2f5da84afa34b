//! Configuration display command.

use console::style;

use super::Context;
use crate::cli::icons::{dim_arrow, mode_badge, success, warn};

/// Show the resolved configuration with the API key redacted.
pub fn cmd_config_show(ctx: &Context) -> anyhow::Result<()> {
    let config = &ctx.config;
    let llm = config.llm.redacted();

    println!("\n{}", style("Configuration").bold());
    println!("{}", "-".repeat(50));
    match &config.source_path {
        Some(path) => println!("  {:<12} {}", "File", path.display()),
        None => println!("  {:<12} {}", "File", style("(defaults)").dim()),
    }
    println!("  {:<12} {}", "Store", config.store_path().display());
    println!("  {:<12} {}", "Batch limit", config.batch_limit);

    println!("\n{}", style("Annotation").bold());
    let mode = ctx.service.mode();
    let icon = if mode.is_mock() { warn() } else { success() };
    println!("  {} {:<10} {} {}", icon, "Mode", mode, mode_badge(mode));
    println!("  {} {:<10} {}", dim_arrow(), "Provider", llm.provider_name());
    println!("  {} {:<10} {}", dim_arrow(), "Endpoint", llm.endpoint());
    println!("  {} {:<10} {}", dim_arrow(), "Model", llm.model());
    println!(
        "  {} {:<10} {}",
        dim_arrow(),
        "API key",
        llm.api_key.as_deref().unwrap_or("(not set)")
    );
    if mode.is_mock() {
        println!("    {}", style(config.llm.availability_hint()).dim());
    }
    Ok(())
}
