//! Dataset commands.

use std::path::PathBuf;

use ajar_dataset::DatasetBuilder;
use anyhow::Result;
use clap::{Args, Subcommand};
use console::style;

use super::Context;

/// Build the fine-tuning dataset
#[derive(Args, Debug)]
pub struct DatasetArgs {
    #[command(subcommand)]
    pub command: DatasetCommand,
}

#[derive(Subcommand, Debug)]
pub enum DatasetCommand {
    /// Regenerate the dataset from memory notes and good-rated transcripts
    Build {
        /// Output file (default: <data_dir>/training/dataset.jsonl)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Count samples without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(args: DatasetArgs, ctx: &Context) -> Result<()> {
    match args.command {
        DatasetCommand::Build { output, dry_run } => cmd_build(ctx, output, dry_run),
    }
}

fn builder(ctx: &Context, output: Option<PathBuf>) -> DatasetBuilder {
    let storage = ctx.config.storage();
    let output = output.unwrap_or_else(|| storage.dataset_path());
    let builder = DatasetBuilder::new(storage.memory_path(), storage.log_path(), output);
    match ctx.config.dataset().fallback_instruction {
        Some(instruction) => builder.with_fallback_instruction(instruction),
        None => builder,
    }
}

fn cmd_build(ctx: &Context, output: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let builder = builder(ctx, output);

    if dry_run {
        let collected = builder.collect();
        if ctx.json_output {
            println!(
                "{}",
                serde_json::json!({
                    "sample_count": collected.samples.len(),
                    "memory_samples": collected.memory_samples,
                    "log_samples": collected.log_samples,
                    "skipped": collected.skipped,
                    "ineligible": collected.ineligible,
                    "dry_run": true,
                })
            );
        } else {
            println!(
                "Would write {} sample(s) ({} from memory, {} from logs) to {}",
                collected.samples.len(),
                collected.memory_samples,
                collected.log_samples,
                style(builder.output_path().display()).dim()
            );
        }
        return Ok(());
    }

    let report = builder.build()?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &report.output {
        Some(path) => println!(
            "{} Wrote {} sample(s) to {}",
            style("✓").green().bold(),
            report.sample_count,
            path.display()
        ),
        None => println!("{}", style("No samples generated, dataset left unchanged").yellow()),
    }
    if ctx.verbose || report.skipped > 0 {
        println!(
            "  memory: {}  logs: {}  skipped: {}  not rated good: {}",
            report.memory_samples, report.log_samples, report.skipped, report.ineligible
        );
    }
    Ok(())
}
