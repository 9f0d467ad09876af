//! Error types for the dataset crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a dataset build. Per-sample problems never do.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The output file or its directory could not be written.
    #[error("Failed to write dataset at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A sample could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
