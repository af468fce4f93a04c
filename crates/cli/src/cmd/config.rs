//! Configuration command
//!
//! Shows the effective configuration or prints an example file.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use reducer_cli::settings::{self, Settings};
use std::path::Path;

/// Print the configuration loaded from `path` (defaults when absent)
pub fn run_show(settings: &Settings, path: Option<&Path>) -> Result<()> {
    println!("{}", "Configuration".bold());
    match path {
        Some(path) => println!("{}: {}\n", "Location".dimmed(), path.display().dimmed()),
        None => println!("{}\n", "No config file given, showing defaults".dimmed()),
    }

    let prune = &settings.prune;
    println!("{}", "[prune]".yellow());
    println!("  {} = {:?}", "bucket".cyan(), prune.bucket);
    println!("  {} = {:?}", "prefix".cyan(), prune.prefix);
    println!(
        "  {} = {} {}",
        "retention_days".cyan(),
        prune.retention_days,
        "(always keep newer objects)".dimmed()
    );
    match prune.weekly_window_days {
        Some(days) => println!("  {} = {}", "weekly_window_days".cyan(), days),
        None => println!(
            "  {} {}",
            "weekly_window_days".cyan(),
            "(unbounded)".dimmed()
        ),
    }
    println!("  {} = {}", "interactive".cyan(), prune.interactive);
    match prune.confirm_timeout_secs {
        Some(secs) => println!("  {} = {}", "confirm_timeout_secs".cyan(), secs),
        None => println!(
            "  {} {}",
            "confirm_timeout_secs".cyan(),
            "(wait forever)".dimmed()
        ),
    }
    println!("  {} = {}", "dry_run".cyan(), prune.dry_run);
    println!("  {} = {}", "batch_size".cyan(), prune.batch_size);
    println!("  {} = {}", "quiet".cyan(), prune.quiet);

    println!("\n{}", "[s3]".yellow());
    let s3 = toml::to_string(&settings.s3).context("Failed to render [s3] table")?;
    for line in s3.lines() {
        println!("  {}", line);
    }

    println!("\n{}", "[log]".yellow());
    println!("  {} = {:?}", "level".cyan(), settings.log.level);
    if let Some(file) = &settings.log.file {
        println!("  {} = {:?}", "file".cyan(), file.display().to_string());
    }

    if let Err(err) = prune.validate() {
        println!("\n{} {}", "Invalid:".red().bold(), err);
    }

    Ok(())
}

/// Show example configuration
pub fn run_example() -> Result<()> {
    print!("{}", settings::example_config());
    Ok(())
}
