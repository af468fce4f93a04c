//! Prune a bucket down to one backup per week and per year

use crate::util;
use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use reducer_cli::logging;
use reducer_cli::prompt::StdinPrompt;
use reducer_cli::settings::{self, Settings};
use retention::{BatchOutcome, Pruner, PruneReport, SystemClock, TracingSink};
use s3_store::S3Store;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct PruneArgs {
    /// Bucket holding the backups
    pub bucket: Option<String>,

    /// Only consider objects under this prefix
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Keep everything modified within this many days
    #[arg(short = 'd', long = "retain-days", value_name = "DAYS")]
    pub retain_days: Option<u32>,

    /// Keep one object per week for this many days before the cutoff
    #[arg(long, value_name = "DAYS", conflicts_with = "unbounded_weekly")]
    pub weekly_window_days: Option<u32>,

    /// Keep one object per week for every object older than the cutoff
    #[arg(long)]
    pub unbounded_weekly: bool,

    /// Ask before deleting each batch
    #[arg(short = 'i', long, overrides_with = "no_interactive")]
    pub interactive: bool,

    /// Never ask before deleting
    #[arg(short = 'I', long, overrides_with = "interactive")]
    pub no_interactive: bool,

    /// Skip a batch when no answer arrives within this many seconds
    #[arg(long, value_name = "SECS")]
    pub confirm_timeout: Option<u64>,

    /// Only report what would be deleted
    #[arg(long, overrides_with = "no_dry_run")]
    pub dry_run: bool,

    /// Actually delete objects
    #[arg(long, overrides_with = "dry_run")]
    pub no_dry_run: bool,

    /// Keys per bulk delete request (1-1000)
    #[arg(short = 's', long = "delete-batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Do not ask S3 to list every deleted key
    #[arg(short = 'q', long = "delete-quietly", overrides_with = "no_quiet")]
    pub quiet: bool,

    /// Ask S3 to list every deleted key
    #[arg(long = "no-delete-quietly", overrides_with = "quiet")]
    pub no_quiet: bool,

    /// AWS region
    #[arg(long)]
    pub region: Option<String>,

    /// Named AWS profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Custom S3 endpoint, e.g. for MinIO
    #[arg(long = "endpoint-url", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, overrides_with = "no_force_path_style")]
    pub force_path_style: bool,

    /// Use virtual-hosted bucket addressing
    #[arg(long, overrides_with = "force_path_style")]
    pub no_force_path_style: bool,

    /// Log level: off, critical, error, warning, info, debug, trace
    #[arg(short = 'l', long, value_name = "LEVEL", value_parser = settings::parse_level)]
    pub log_level: Option<tracing::level_filters::LevelFilter>,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl PruneArgs {
    /// Overlay the flags that were given on top of `settings`
    pub fn apply(&self, mut settings: Settings) -> Settings {
        let prune = &mut settings.prune;
        if let Some(bucket) = &self.bucket {
            prune.bucket = bucket.clone();
        }
        if let Some(prefix) = &self.prefix {
            prune.prefix = prefix.clone();
        }
        if let Some(days) = self.retain_days {
            prune.retention_days = days;
        }
        if self.unbounded_weekly {
            prune.weekly_window_days = None;
        } else if let Some(days) = self.weekly_window_days {
            prune.weekly_window_days = Some(days);
        }
        if let Some(interactive) = util::tri_state(self.interactive, self.no_interactive) {
            prune.interactive = interactive;
        }
        if let Some(secs) = self.confirm_timeout {
            prune.confirm_timeout_secs = Some(secs);
        }
        if let Some(dry_run) = util::tri_state(self.dry_run, self.no_dry_run) {
            prune.dry_run = dry_run;
        }
        if let Some(size) = self.batch_size {
            prune.batch_size = size;
        }
        if let Some(quiet) = util::tri_state(self.quiet, self.no_quiet) {
            prune.quiet = quiet;
        }

        let s3 = &mut settings.s3;
        if let Some(region) = &self.region {
            s3.region = Some(region.clone());
        }
        if let Some(profile) = &self.profile {
            s3.profile = Some(profile.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            s3.endpoint = Some(endpoint.clone());
        }
        let path_style = util::tri_state(self.force_path_style, self.no_force_path_style);
        if let Some(path_style) = path_style {
            s3.force_path_style = path_style;
        }

        if let Some(level) = self.log_level {
            settings.log.level = level.to_string();
        }
        if let Some(file) = &self.log_file {
            settings.log.file = Some(file.clone());
        }

        settings
    }
}

pub async fn run(args: PruneArgs, settings: Settings) -> Result<()> {
    // 1. Merge flags over the config file
    let settings = args.apply(settings);
    let _log_guard = logging::init(settings.log.level_filter()?, settings.log.file.as_deref())?;

    // 2. Reject bad input before resolving credentials
    settings
        .prune
        .validate()
        .context("Invalid configuration")?;

    // 3. Connect and run
    let store = S3Store::connect(&settings.s3).await;
    let prompt = StdinPrompt::stdin();
    let report = Pruner::new(&store, &prompt, &SystemClock)
        .run(&settings.prune, &mut TracingSink)
        .await
        .with_context(|| format!("Failed to prune bucket {}", settings.prune.bucket))?;

    // 4. Report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if report.has_failures() {
        anyhow::bail!(
            "{} of {} batches had failures",
            report
                .batches
                .iter()
                .filter(|b| b.outcome.has_failures())
                .count(),
            report.batches.len()
        );
    }

    Ok(())
}

fn print_summary(report: &PruneReport) {
    let title = if report.dry_run {
        "Dry Run Complete".yellow().bold().to_string()
    } else {
        "Pruning Complete".green().bold().to_string()
    };
    println!("{}", title);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    println!("Bucket:              {}", util::location(&report.bucket, &report.prefix).cyan());
    println!("Objects listed:      {}", report.listed);
    println!(
        "Older than cutoff:   {} {}",
        report.actionable,
        format!("(before {})", util::format_time(report.cutoff)).dimmed()
    );
    println!("Kept yearly:         {}", report.kept_yearly);
    match report.weekly_since {
        Some(since) => println!(
            "Kept weekly:         {} {}",
            report.kept_weekly,
            format!("(since {})", util::format_time(since)).dimmed()
        ),
        None => println!("Kept weekly:         {}", report.kept_weekly),
    }
    if report.directory_markers + report.undated > 0 {
        println!(
            "Ignored:             {} {}",
            report.directory_markers + report.undated,
            format!(
                "({} directory markers, {} undated)",
                report.directory_markers, report.undated
            )
            .dimmed()
        );
    }
    println!();

    if report.candidates == 0 {
        println!("{}", "Nothing to delete".dimmed());
        return;
    }

    println!("Candidates:          {}", report.candidates.to_string().yellow());
    println!(
        "Batches:             {} {}",
        report.batches.len(),
        format!(
            "({} deleted, {} dry run, {} skipped, {} failed)",
            report.deleted_batches(),
            report.dry_run_batches(),
            report.skipped_batches(),
            report.failed_batches()
        )
        .dimmed()
    );
    for batch in &report.batches {
        let status = match &batch.outcome {
            BatchOutcome::DryRun => "would delete".yellow().to_string(),
            BatchOutcome::Skipped { reason } => format!("skipped ({reason})").dimmed().to_string(),
            BatchOutcome::Deleted { errors, .. } if errors.is_empty() => {
                "deleted".green().to_string()
            }
            BatchOutcome::Deleted { errors, .. } => {
                format!("deleted with {} errors", errors.len()).red().to_string()
            }
            BatchOutcome::Failed { error } => format!("failed: {error}").red().to_string(),
        };
        println!(
            "  Batch {:>3}: {:>4} objects {}",
            batch.batch,
            batch.keys.len(),
            status
        );
    }

    if !report.dry_run {
        println!();
        println!("Deleted:             {}", report.deleted().to_string().green());
    }
}
