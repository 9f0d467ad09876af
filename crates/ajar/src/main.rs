//! Ajar - operator CLI for the coding assistant's data.
//!
//! Main entry point for the `ajar` binary.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

mod commands;

use commands::{config, dataset, feedback, log, memory};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Ajar - memory, transcripts and fine-tuning data for a coding assistant
#[derive(Parser)]
#[command(name = "ajar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Data directory (default: ./data)
    #[arg(long, global = true, env = "AJAR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file to use instead of the discovered ones
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Memory note operations
    Memory(memory::MemoryArgs),

    /// Transcript log operations
    Log(log::LogArgs),

    /// Rate a logged exchange
    Feedback(feedback::FeedbackArgs),

    /// Build the fine-tuning dataset
    Dataset(dataset::DatasetArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut app_config, warnings) = match &cli.config {
        Some(path) => (
            ajar_config::load_config_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            Vec::new(),
        ),
        None => {
            let loaded = ajar_config::load_config(None)?;
            (loaded.config, loaded.warnings)
        }
    };
    if let Some(dir) = &cli.data_dir {
        app_config.storage = Some(app_config.storage().with_data_dir_override(dir));
    }

    // Console layer on stderr, JSON layer to a daily rolling file
    let filter = if cli.verbose {
        "ajar=debug,ajar_memory=debug,ajar_transcript=debug,ajar_dataset=debug,ajar_config=debug,info"
    } else {
        "ajar=info,ajar_memory=warn,ajar_transcript=warn,ajar_dataset=info,warn"
    };

    let log_dir = app_config.storage().logs_dir();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "ajar.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "ajar=trace,ajar_memory=trace,ajar_transcript=trace,ajar_dataset=trace,ajar_config=trace,info",
                )),
        )
        .init();

    for warning in &warnings {
        warn!("{}", warning);
    }

    let ctx = commands::Context {
        config: app_config,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Memory(args) => memory::run(args, &ctx),
        Commands::Log(args) => log::run(args, &ctx),
        Commands::Feedback(args) => feedback::run(args, &ctx),
        Commands::Dataset(args) => dataset::run(args, &ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
