//! Memory notes for the Ajar coding assistant.
//!
//! A memory note is a correction or preference a user attached to a session.
//! Request handlers look up the notes relevant to the incoming message and
//! feed them to the model; the dataset builder later turns notes that carry
//! an `ideal_output` into training samples.
//!
//! # Storage
//!
//! The whole collection lives in one JSON array file. Appends are
//! read-modify-write over that file, serialized by a per-store lock and
//! committed with an atomic rename. Reads never take the lock.
//!
//! # Usage
//!
//! ```no_run
//! use ajar_memory::MemoryStore;
//!
//! let store = MemoryStore::open("data/memories.json")?;
//! store.append("sess-1", "preference", "Use React Query for data fetching", vec!["react".into()])?;
//!
//! let notes = store.query_relevant("sess-1", "react query", 5);
//! assert_eq!(notes[0].id, 1);
//! # Ok::<(), ajar_memory::MemoryError>(())
//! ```

pub mod error;
pub mod store;
pub mod validation;

pub use error::{MemoryError, Result};
pub use store::{MemoryStore, load_notes};
pub use validation::{ValidationError, validate_draft, validate_session_id};
