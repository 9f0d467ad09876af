//! Transcript records: one logged exchange with the completion function.

use serde::{Deserialize, Serialize};

use crate::{ChatMessage, NoteId, Timestamp, now};

/// Post-hoc quality rating of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Good,
    Bad,
    NeedsReview,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
            Self::NeedsReview => "needs_review",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(Self::Good),
            "bad" => Ok(Self::Bad),
            "needs_review" => Ok(Self::NeedsReview),
            other => Err(format!(
                "unknown rating '{other}' (expected good, bad or needs_review)"
            )),
        }
    }
}

fn default_source() -> String {
    "chat".to_string()
}

/// A full conversation sent to and returned from the completion function.
///
/// Only `rating` and `feedback_comment` ever change after the record is
/// appended, and only through feedback reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub id: String,
    pub session_id: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub used_memory_ids: Vec<NoteId>,
    #[serde(default)]
    pub rating: Option<Rating>,
    /// Producer tag: `chat`, `slice`, `api`, `test`.
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(with = "crate::time::iso_millis")]
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_comment: Option<String>,
}

impl TranscriptRecord {
    /// Create an unrated record stamped now, with a `<session>-<unix millis>` id.
    pub fn new(
        session_id: impl Into<String>,
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        source: impl Into<String>,
    ) -> Self {
        let session_id = session_id.into();
        let created_at = now();
        Self {
            id: format!("{}-{}", session_id, created_at.timestamp_millis()),
            session_id,
            model: model.into(),
            messages,
            used_memory_ids: Vec::new(),
            rating: None,
            source: source.into(),
            created_at,
            feedback_comment: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_used_memory_ids(mut self, ids: Vec<NoteId>) -> Self {
        self.used_memory_ids = ids;
        self
    }

    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }
}
