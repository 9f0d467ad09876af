//! Transcript log for the Ajar coding assistant.
//!
//! Every exchange with the completion function is appended as one JSON line.
//! The log is the audit trail and the raw material for the training dataset;
//! it is never compacted and records never move. The only mutation is the
//! feedback reconciler merging a rating (and optional comment) into records
//! after the fact.

pub mod error;
pub mod feedback;
pub mod log;

pub use error::{FeedbackValidationError, Result, TranscriptError};
pub use feedback::{FeedbackOutcome, FeedbackReconciler, FeedbackRequest};
pub use log::{TranscriptLog, TranscriptScan};
