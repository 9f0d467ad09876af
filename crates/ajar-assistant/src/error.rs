//! Error types for the assistant flows.

use thiserror::Error;

use crate::completer::CompletionError;

/// Errors surfaced to the request handler.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Required request input is missing.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("memory error: {0}")]
    Memory(#[from] ajar_memory::MemoryError),

    #[error("transcript error: {0}")]
    Transcript(#[from] ajar_transcript::TranscriptError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Result type alias for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;
