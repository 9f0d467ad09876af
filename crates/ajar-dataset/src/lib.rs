//! Dataset builder for the Ajar coding assistant.
//!
//! A one-shot batch job: read the memory collection and the transcript log,
//! turn every eligible entry into a normalized instruction/input/output
//! sample, and overwrite the dataset file with the result.
//!
//! Eligibility:
//! - memory notes need a non-empty `ideal_output`
//! - transcripts need `rating == good` plus a non-empty last user message and
//!   last assistant message
//!
//! Memory samples come first, then log samples, each group in source order,
//! so an unchanged input reproduces a byte-identical file. A run that yields
//! no samples leaves any previous dataset alone.

pub mod builder;
pub mod error;
pub mod normalize;

pub use builder::{BuildReport, Collected, DatasetBuilder};
pub use error::{DatasetError, Result};
pub use normalize::normalize_whitespace;
