//! Configuration commands.

use std::path::PathBuf;

use ajar_config::AjarConfig;
use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::style;

use super::Context;

/// Configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration and resolved paths
    Show,

    /// Write a config file populated with defaults
    Init {
        /// Where to write (default: user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Init { path, force } => cmd_init(ctx, path, force),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let storage = ctx.config.storage();
    let assistant = ctx.config.assistant();

    if ctx.json_output {
        let out = serde_json::json!({
            "data_dir": storage.effective_data_dir(),
            "memory_file": storage.memory_path(),
            "log_file": storage.log_path(),
            "dataset_file": storage.dataset_path(),
            "model": assistant.effective_model(),
            "vision_model": assistant.effective_vision_model(),
            "default_session": assistant.default_session,
            "memory_limit": ctx.config.memory().default_limit,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", style("Paths").bold());
    println!("  data dir:  {}", storage.effective_data_dir().display());
    println!("  memories:  {}", storage.memory_path().display());
    println!("  logs:      {}", storage.log_path().display());
    println!("  dataset:   {}", storage.dataset_path().display());
    println!();
    println!("{}", style("Assistant").bold());
    println!("  model:         {}", assistant.effective_model());
    println!("  vision model:  {}", assistant.effective_vision_model());
    println!("  session:       {}", assistant.default_session);
    println!();
    println!("{}", style("Effective config").bold());
    println!("{}", style("─".repeat(50)).dim());
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

fn cmd_init(ctx: &Context, path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path.or_else(ajar_config::user_config_path) {
        Some(p) => p,
        None => bail!("could not determine a config directory; pass --path"),
    };
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    ajar_config::save_config(&AjarConfig::with_defaults(), &path)?;

    if ctx.json_output {
        println!("{}", serde_json::json!({ "path": path }));
    } else {
        println!(
            "{} Wrote {}",
            style("✓").green().bold(),
            path.display()
        );
    }
    Ok(())
}
