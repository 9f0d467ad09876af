//! Memory note commands.

use std::io::Read;

use ajar_types::{MemoryDraft, MemoryNote};
use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::{Style, style};

use super::{Context, truncate};

/// Memory note operations
#[derive(Args, Debug)]
pub struct MemoryArgs {
    #[command(subcommand)]
    pub command: MemoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum MemoryCommand {
    /// Record a preference or correction note
    Add {
        /// Note content ("-" reads stdin)
        content: String,

        /// Session the note belongs to
        #[arg(short, long)]
        session: Option<String>,

        /// Category of the note
        #[arg(short = 't', long = "type", default_value = "preference")]
        kind: String,

        /// Tag to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Prompt that produced the corrected answer
        #[arg(long)]
        input: Option<String>,

        /// The answer that should have been given
        #[arg(long)]
        ideal_output: Option<String>,

        /// Why the correction was made
        #[arg(long)]
        reason: Option<String>,
    },

    /// Find notes relevant to a query within a session
    Search {
        /// Text to look for (case-insensitive substring)
        query: String,

        /// Session to search
        #[arg(short, long)]
        session: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List every stored note
    List,
}

pub fn run(args: MemoryArgs, ctx: &Context) -> Result<()> {
    match args.command {
        MemoryCommand::Add {
            content,
            session,
            kind,
            tags,
            input,
            ideal_output,
            reason,
        } => {
            let content = if content == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("reading note content from stdin")?;
                buf
            } else {
                content
            };
            let mut draft = MemoryDraft::new(kind, content).with_tags(tags);
            if let Some(input) = input {
                draft = draft.with_input(input);
            }
            if let Some(ideal) = ideal_output {
                draft = draft.with_ideal_output(ideal);
            }
            if let Some(reason) = reason {
                draft = draft.with_reason(reason);
            }
            cmd_add(ctx, &ctx.session(session), draft)
        }
        MemoryCommand::Search {
            query,
            session,
            limit,
        } => {
            let limit = limit.unwrap_or(ctx.config.memory().default_limit);
            cmd_search(ctx, &ctx.session(session), &query, limit)
        }
        MemoryCommand::List => cmd_list(ctx),
    }
}

fn cmd_add(ctx: &Context, session: &str, draft: MemoryDraft) -> Result<()> {
    let store = ctx.memory_store();
    let note = store.append_draft(session, draft)?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        println!(
            "{} Stored note {} in session {}",
            style("✓").green().bold(),
            style(note.id).bold(),
            style(&note.session_id).cyan()
        );
        if ctx.verbose {
            println!("  {}", style(store.path().display()).dim());
        }
    }
    Ok(())
}

fn cmd_search(ctx: &Context, session: &str, query: &str, limit: usize) -> Result<()> {
    let store = ctx.memory_store();
    let notes = store.query_relevant(session, query, limit);

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("{}", style("No matching notes").dim());
        return Ok(());
    }

    println!(
        "{} note(s) matching '{}' in {}",
        notes.len(),
        query,
        style(session).cyan()
    );
    println!("{}", style("─".repeat(50)).dim());
    print_notes(&notes);
    Ok(())
}

fn cmd_list(ctx: &Context) -> Result<()> {
    let store = ctx.memory_store();
    let notes = store.list();

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("{}", style("No notes stored yet").dim());
        return Ok(());
    }

    println!("{} note(s)", notes.len());
    println!("{}", style("─".repeat(50)).dim());
    print_notes(&notes);
    Ok(())
}

fn print_notes(notes: &[MemoryNote]) {
    let dim = Style::new().dim();
    for note in notes {
        println!(
            "  {:>4}  {}  {}",
            style(note.id).bold(),
            style(format!("[{}]", note.kind)).yellow(),
            truncate(&note.content, 60)
        );
        let mut meta = format!(
            "        {} · {}",
            note.session_id,
            note.created_at.format("%Y-%m-%d %H:%M")
        );
        if !note.tags.is_empty() {
            meta.push_str(&format!(" · {}", note.tags.join(", ")));
        }
        println!("{}", dim.apply_to(meta));
    }
}
