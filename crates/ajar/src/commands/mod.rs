//! CLI command handlers.

pub mod config;
pub mod dataset;
pub mod feedback;
pub mod log;
pub mod memory;

use ajar_config::AjarConfig;
use ajar_memory::MemoryStore;
use ajar_transcript::TranscriptLog;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration (with CLI overrides applied).
    pub config: AjarConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Memory store handle. Read-only commands never create the collection.
    pub fn memory_store(&self) -> MemoryStore {
        MemoryStore::at(self.config.storage().memory_path())
    }

    /// Transcript log handle. Nothing is created until a record is appended.
    pub fn transcript_log(&self) -> TranscriptLog {
        TranscriptLog::at(self.config.storage().log_path())
    }

    /// Session named on the command line, else the configured default.
    pub fn session(&self, session: Option<String>) -> String {
        session.unwrap_or_else(|| self.config.assistant().default_session)
    }
}

/// Single-line preview of `s`, at most `max_len` characters.
pub fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_len {
        s
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
