//! Request-side flows of the Ajar coding assistant.
//!
//! Each flow looks up the session's relevant memory notes, folds them into
//! the prompt, calls the completion backend, and appends the exchange to the
//! transcript log so it can be rated and later distilled into training data.
//!
//! The model itself sits behind the [`Completer`] trait; HTTP routing and
//! upload handling live outside this crate.

pub mod assistant;
pub mod completer;
pub mod error;
pub mod prompt;

pub use assistant::{Assistant, ChatReply};
pub use completer::{CompletionError, Completer, MockCompleter, SharedCompleter};
pub use error::{AssistantError, Result};
