//! Transcript log commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use ajar_transcript::TranscriptScan;
use ajar_types::{Rating, TranscriptRecord};
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::style;

use super::{Context, truncate};

/// Transcript log operations
#[derive(Args, Debug)]
pub struct LogArgs {
    #[command(subcommand)]
    pub command: LogCommand,
}

#[derive(Subcommand, Debug)]
pub enum LogCommand {
    /// Append a transcript record given as JSON
    Append {
        /// File holding one JSON record ("-" reads stdin)
        file: PathBuf,
    },

    /// List logged exchanges
    List {
        /// Only show this session
        #[arg(short, long)]
        session: Option<String>,
    },
}

pub fn run(args: LogArgs, ctx: &Context) -> Result<()> {
    match args.command {
        LogCommand::Append { file } => cmd_append(ctx, &file),
        LogCommand::List { session } => cmd_list(ctx, session.as_deref()),
    }
}

fn cmd_append(ctx: &Context, file: &Path) -> Result<()> {
    let raw = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading record from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?
    };
    let record: TranscriptRecord =
        serde_json::from_str(&raw).context("parsing transcript record")?;

    let log = ctx.transcript_log();
    log.append(&record)?;

    if ctx.json_output {
        println!("{}", serde_json::json!({ "id": record.id, "appended": true }));
    } else {
        println!(
            "{} Appended {} to {}",
            style("✓").green().bold(),
            style(&record.id).bold(),
            style(log.path().display()).dim()
        );
    }
    Ok(())
}

fn cmd_list(ctx: &Context, session: Option<&str>) -> Result<()> {
    let path = ctx.config.storage().log_path();
    let mut scan = TranscriptScan::open(&path);
    let records: Vec<TranscriptRecord> = scan
        .by_ref()
        .filter(|r| session.is_none_or(|s| r.session_id == s))
        .collect();
    let skipped = scan.skipped();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", style("No transcripts logged").dim());
    } else {
        println!("{} record(s)", records.len());
        println!("{}", style("─".repeat(50)).dim());
        for record in &records {
            let rating = match record.rating {
                Some(Rating::Good) => style("good").green().to_string(),
                Some(Rating::Bad) => style("bad").red().to_string(),
                Some(Rating::NeedsReview) => style("needs_review").yellow().to_string(),
                None => style("unrated").dim().to_string(),
            };
            let preview = record
                .messages
                .iter()
                .rev()
                .find(|m| m.role == ajar_types::Role::User)
                .map(|m| truncate(&m.content, 50))
                .unwrap_or_default();
            println!("  {}  {}  {}", style(&record.id).bold(), rating, preview);
        }
    }
    if skipped > 0 {
        println!(
            "{}",
            style(format!("{} malformed line(s) skipped", skipped)).yellow()
        );
    }
    Ok(())
}
