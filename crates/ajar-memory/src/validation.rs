//! Input validation for memory intake.

use ajar_types::MemoryDraft;

/// Specific validation failures for a note about to be stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Session ID is empty.
    #[error("session ID is empty")]
    EmptySessionId,

    /// Note content is empty or whitespace only.
    #[error("memory content is empty")]
    EmptyContent,

    /// Note type tag is empty.
    #[error("memory type is empty")]
    EmptyType,
}

/// Validate a session ID.
pub fn validate_session_id(session_id: &str) -> Result<(), ValidationError> {
    if session_id.trim().is_empty() {
        return Err(ValidationError::EmptySessionId);
    }
    Ok(())
}

/// Validate a draft before it is assigned an id.
pub fn validate_draft(draft: &MemoryDraft) -> Result<(), ValidationError> {
    if draft.kind.trim().is_empty() {
        return Err(ValidationError::EmptyType);
    }
    if draft.content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session_id() {
        assert!(validate_session_id("sess-1").is_ok());
        assert_eq!(
            validate_session_id("  "),
            Err(ValidationError::EmptySessionId)
        );
    }

    #[test]
    fn test_validate_draft() {
        assert!(validate_draft(&MemoryDraft::new("note", "keep it short")).is_ok());
        assert_eq!(
            validate_draft(&MemoryDraft::new("note", " \n\t")),
            Err(ValidationError::EmptyContent)
        );
        assert_eq!(
            validate_draft(&MemoryDraft::new("", "content")),
            Err(ValidationError::EmptyType)
        );
    }
}
