//! Backup reducer CLI - reducer command

use anyhow::Result;
use clap::{Parser, Subcommand};
use reducer_cli::settings;
use std::path::PathBuf;

mod cmd;
mod util;

/// Reducer - thin out old backups in S3 to one per week and one per year
#[derive(Parser)]
#[command(name = "reducer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config file; command-line flags take precedence
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete backups that no retention tier keeps
    Prune(cmd::prune::PruneArgs),
    /// Show the effective configuration
    Config {
        /// Print a commented example config file instead
        #[arg(long)]
        example: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { example: true } => cmd::config::run_example(),
        Commands::Config { example: false } => {
            let settings = settings::load(cli.config.as_deref())?;
            cmd::config::run_show(&settings, cli.config.as_deref())
        }
        Commands::Prune(args) => {
            let settings = settings::load(cli.config.as_deref())?;
            cmd::prune::run(args, settings).await
        }
    }
}
