//! Post-hoc feedback reconciliation.
//!
//! Feedback names a transcript record by id (optionally scoped to a session)
//! and merges a rating and comment into it. The whole log is read, matching
//! lines are rewritten in place, and the file is replaced atomically. Lines
//! that are not matched, including ones that do not parse, are written back
//! byte for byte.

use std::fs;
use std::io::ErrorKind;
use std::sync::Arc;

use ajar_types::Rating;
use ajar_types::fs::write_atomic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{FeedbackValidationError, TranscriptError};
use crate::{Result, TranscriptLog};

/// A rating (and optional comment) for one transcript record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// When present, only records of this session match.
    #[serde(default, alias = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(alias = "messageId")]
    pub message_id: String,
    pub rating: Rating,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl FeedbackRequest {
    pub fn new(message_id: impl Into<String>, rating: Rating) -> Self {
        Self {
            session_id: None,
            message_id: message_id.into(),
            rating,
            comment: None,
        }
    }

    pub fn in_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Reject requests that could never match a record.
    pub fn validate(&self) -> std::result::Result<(), FeedbackValidationError> {
        if self.message_id.trim().is_empty() {
            return Err(FeedbackValidationError::MissingMessageId);
        }
        if self.session_id.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(FeedbackValidationError::EmptySessionId);
        }
        Ok(())
    }

    fn matches(&self, entry: &serde_json::Map<String, Value>) -> bool {
        let same_id = entry.get("id").and_then(Value::as_str) == Some(self.message_id.as_str());
        let same_session = match &self.session_id {
            Some(session) => {
                entry.get("session_id").and_then(Value::as_str) == Some(session.as_str())
            }
            None => true,
        };
        same_id && same_session
    }
}

/// Outcome of applying feedback. Not finding the target is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// `count` records matched and were rewritten (ids are not enforced unique).
    Updated { count: usize },
    /// No record matched; the log was left untouched.
    NotFound,
}

impl FeedbackOutcome {
    pub fn found(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Merges feedback into records of a [`TranscriptLog`].
///
/// Holds the log's write lock for the whole read-modify-write, so it cannot
/// interleave with appends or another reconciliation through the same handle.
#[derive(Debug, Clone)]
pub struct FeedbackReconciler {
    log: Arc<TranscriptLog>,
}

impl FeedbackReconciler {
    pub fn new(log: Arc<TranscriptLog>) -> Self {
        Self { log }
    }

    /// Apply a rating/comment to every record matching the request.
    pub fn apply(&self, request: &FeedbackRequest) -> Result<FeedbackOutcome> {
        request.validate()?;

        let path = self.log.path();
        let _guard = self.log.lock_writes();

        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "Transcript log not found, feedback not applied");
                return Ok(FeedbackOutcome::NotFound);
            }
            Err(source) => {
                return Err(TranscriptError::Storage {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut count = 0;
        let mut contents = Vec::with_capacity(raw.len());
        for line in raw
            .split(|b| *b == b'\n')
            .filter(|l| !l.iter().all(u8::is_ascii_whitespace))
        {
            match serde_json::from_slice::<Value>(line) {
                Ok(Value::Object(mut entry)) if request.matches(&entry) => {
                    entry.insert(
                        "rating".to_string(),
                        Value::String(request.rating.as_str().to_string()),
                    );
                    if let Some(comment) = &request.comment {
                        entry.insert(
                            "feedback_comment".to_string(),
                            Value::String(comment.clone()),
                        );
                    }
                    serde_json::to_writer(&mut contents, &entry)?;
                    count += 1;
                }
                _ => contents.extend_from_slice(line),
            }
            contents.push(b'\n');
        }

        if count == 0 {
            warn!(
                message_id = %request.message_id,
                session_id = ?request.session_id,
                "Transcript record not found for feedback"
            );
            return Ok(FeedbackOutcome::NotFound);
        }

        write_atomic(path, &contents).map_err(|source| TranscriptError::Storage {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            message_id = %request.message_id,
            session_id = ?request.session_id,
            rating = %request.rating,
            count,
            "Applied feedback"
        );
        Ok(FeedbackOutcome::Updated { count })
    }
}
