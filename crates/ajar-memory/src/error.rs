//! Error types for the memory crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur in the memory crate.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The backing file or its directory could not be created, read or written.
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The collection exists but is not a JSON array; appending would destroy it.
    #[error("Memory collection at {path} is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input rejected before any mutation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
