mod commands;
mod feed;
mod render;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fixture_sync_core::RunSummary;
use fixture_sync_core::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fixture-sync")]
#[command(about = "Keep a calendar in sync with a football fixture feed")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/fixture-sync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch fixtures and bring the calendar in line with them
    Sync {
        /// Season start year (defaults to the season in progress)
        #[arg(long)]
        season: Option<i32>,

        /// Show the plan without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Also delete untracked entries carrying the fixture marker
        #[arg(long)]
        deep_clean: bool,
    },
    /// Show what a sync would change
    Status {
        /// Season start year (defaults to the season in progress)
        #[arg(long)]
        season: Option<i32>,
    },
    /// Delete every entry fixture-sync created
    Clean {
        /// Also delete untracked entries carrying the fixture marker
        #[arg(long)]
        deep_clean: bool,

        /// Show what would be deleted without deleting it
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;

    let summary = match cli.command {
        Commands::Sync {
            season,
            dry_run,
            deep_clean,
        } => {
            config.sync.enable_duplicate_cleanup |= deep_clean;
            config.validate()?;
            commands::sync::run(&config, season, dry_run).await?
        }
        Commands::Status { season } => {
            config.validate()?;
            commands::status::run(&config, season).await?;
            None
        }
        Commands::Clean {
            deep_clean,
            dry_run,
        } => {
            config.sync.enable_duplicate_cleanup |= deep_clean;
            config.validate_store()?;
            commands::clean::run(&config, dry_run).await?
        }
    };

    if run_succeeded(summary.as_ref()) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// A run that failed an operation or was interrupted did not converge.
/// Dry runs and read-only commands have no summary and always succeed.
fn run_succeeded(summary: Option<&RunSummary>) -> bool {
    summary.is_none_or(RunSummary::is_clean)
}
