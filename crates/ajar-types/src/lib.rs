//! Shared types for the Ajar coding assistant.
//!
//! These are the records that cross crate boundaries: memory notes written by
//! the correction intake, transcript records appended after every completion,
//! and the dataset samples derived from both for supervised fine-tuning.

pub mod dataset;
pub mod fs;
pub mod memory;
pub mod message;
pub mod time;
pub mod transcript;

pub use dataset::{DatasetSample, SampleSource};
pub use memory::{MemoryDraft, MemoryNote, NoteId};
pub use message::{ChatMessage, Role};
pub use transcript::{Rating, TranscriptRecord};

/// Timestamp type used throughout the system.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub use time::now;
