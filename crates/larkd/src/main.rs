//! Lark Daemon - scheduled update checks for the Lark application
//!
//! Polls the configured release channel on a daily cadence, records detected
//! updates, and applies caller feedback (skip / downloaded) to the persisted
//! schedule.

mod notice;
mod scheduler;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

const DEFAULT_CONFIG_PATH: &str = "/etc/lark/config.toml";
const DEFAULT_STATE_DIR: &str = "/var/lib/lark";

#[derive(Parser)]
#[command(name = "larkd")]
#[command(about = "Lark update daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory holding the persisted schedule and pending notices
    #[arg(long, default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduled update check loop
    Run,

    /// Perform a single update check now
    Check,

    /// Postpone the pending update for a day
    Skip,

    /// Mark the pending update as downloaded
    Downloaded,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    info!("larkd v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run => scheduler::run(&cli.config, &cli.state_dir).await,
        Commands::Check => scheduler::check_once(&cli.config, &cli.state_dir).await,
        Commands::Skip => scheduler::skip_pending(&cli.config, &cli.state_dir),
        Commands::Downloaded => scheduler::mark_downloaded(&cli.config, &cli.state_dir),
    }
}
