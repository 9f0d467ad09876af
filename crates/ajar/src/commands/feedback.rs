//! Feedback command.

use std::sync::Arc;

use ajar_transcript::{FeedbackOutcome, FeedbackReconciler, FeedbackRequest};
use ajar_types::Rating;
use anyhow::{Result, bail};
use clap::Args;
use console::style;

use super::Context;

/// Rate a logged exchange
#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// Id of the logged exchange
    pub message_id: String,

    /// Rating: good, bad or needs_review
    #[arg(value_parser = parse_rating)]
    pub rating: Rating,

    /// Only match records from this session
    #[arg(short, long)]
    pub session: Option<String>,

    /// Free-form comment stored with the rating
    #[arg(short, long)]
    pub comment: Option<String>,
}

fn parse_rating(s: &str) -> std::result::Result<Rating, String> {
    s.parse()
}

pub fn run(args: FeedbackArgs, ctx: &Context) -> Result<()> {
    let mut request = FeedbackRequest::new(args.message_id, args.rating);
    if let Some(session) = args.session {
        request = request.in_session(session);
    }
    if let Some(comment) = args.comment {
        request = request.with_comment(comment);
    }

    let reconciler = FeedbackReconciler::new(Arc::new(ctx.transcript_log()));
    match reconciler.apply(&request)? {
        FeedbackOutcome::Updated { count } => {
            if ctx.json_output {
                println!(
                    "{}",
                    serde_json::json!({ "ok": true, "updated": count })
                );
            } else {
                println!(
                    "{} Rated {} as {} ({} record(s))",
                    style("✓").green().bold(),
                    style(&request.message_id).bold(),
                    request.rating,
                    count
                );
            }
            Ok(())
        }
        FeedbackOutcome::NotFound => {
            if ctx.json_output {
                println!(
                    "{}",
                    serde_json::json!({ "ok": false, "error": "message not found" })
                );
            }
            bail!("message not found: {}", request.message_id)
        }
    }
}
