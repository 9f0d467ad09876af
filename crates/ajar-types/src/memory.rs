//! Memory note types.

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Identifier of a memory note. Unique and strictly increasing across a store.
pub type NoteId = u64;

/// A durable preference or correction tied to a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryNote {
    pub id: NoteId,
    pub session_id: String,
    /// Free-form tag such as `correction`, `preference` or `note`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    /// The known-correct answer; notes without one carry no supervised value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(with = "crate::time::iso_millis")]
    pub created_at: Timestamp,
}

/// Everything the intake supplies for a new note. The store assigns `id`,
/// `session_id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDraft {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MemoryDraft {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_ideal_output(mut self, ideal_output: impl Into<String>) -> Self {
        self.ideal_output = Some(ideal_output.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_uses_type_key_and_omits_absent_fields() {
        let note = MemoryNote {
            id: 3,
            session_id: "s1".into(),
            kind: "correction".into(),
            tags: vec!["react-query".into()],
            content: "use React Query".into(),
            input: None,
            ideal_output: Some("fetch via React Query".into()),
            reason: None,
            created_at: "2025-01-02T03:04:05Z".parse().unwrap(),
        };

        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["type"], "correction");
        assert!(value.get("input").is_none());
        assert!(value.get("reason").is_none());
        assert_eq!(value["ideal_output"], "fetch via React Query");
    }

    #[test]
    fn test_note_accepts_missing_tags() {
        let json = r#"{"id":1,"session_id":"s","type":"note","content":"c","created_at":"2025-01-01T00:00:00.000Z"}"#;
        let note: MemoryNote = serde_json::from_str(json).unwrap();
        assert!(note.tags.is_empty());
        assert!(note.ideal_output.is_none());
    }
}
