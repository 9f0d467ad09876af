//! Errors raised by the transcript log and feedback reconciler.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid feedback: {0}")]
    Validation(#[from] FeedbackValidationError),
}

/// Feedback rejected before the log is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackValidationError {
    #[error("message ID is required")]
    MissingMessageId,

    #[error("session ID, when given, must not be empty")]
    EmptySessionId,
}

pub type Result<T> = std::result::Result<T, TranscriptError>;
