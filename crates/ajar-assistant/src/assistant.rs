//! The assistant: memory lookup, completion, transcript logging.

use std::sync::Arc;

use ajar_config::{AssistantConfig, MemoryConfig};
use ajar_memory::MemoryStore;
use ajar_transcript::{FeedbackOutcome, FeedbackReconciler, FeedbackRequest, TranscriptLog};
use ajar_types::{ChatMessage, MemoryDraft, MemoryNote, NoteId, Role, TranscriptRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::completer::SharedCompleter;
use crate::error::{AssistantError, Result};
use crate::prompt;

/// Reply to a chat or slicing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    /// Transcript id to attach feedback to.
    pub message_id: String,
    pub answer: String,
    pub used_memory_ids: Vec<NoteId>,
}

/// Ties the stores and the completion backend together for request handlers.
pub struct Assistant {
    memory: Arc<MemoryStore>,
    log: Arc<TranscriptLog>,
    feedback: FeedbackReconciler,
    completer: SharedCompleter,
    model: String,
    vision_model: String,
    default_session: String,
    memory_limit: usize,
}

impl Assistant {
    pub fn new(
        memory: Arc<MemoryStore>,
        log: Arc<TranscriptLog>,
        completer: SharedCompleter,
    ) -> Self {
        Self::with_config(
            memory,
            log,
            completer,
            &AssistantConfig::default(),
            &MemoryConfig::default(),
        )
    }

    pub fn with_config(
        memory: Arc<MemoryStore>,
        log: Arc<TranscriptLog>,
        completer: SharedCompleter,
        assistant: &AssistantConfig,
        memory_config: &MemoryConfig,
    ) -> Self {
        Self {
            feedback: FeedbackReconciler::new(Arc::clone(&log)),
            memory,
            log,
            completer,
            model: assistant.effective_model(),
            vision_model: assistant.effective_vision_model(),
            default_session: assistant.default_session.clone(),
            memory_limit: memory_config.default_limit,
        }
    }

    fn session<'a>(&'a self, session_id: Option<&'a str>) -> &'a str {
        session_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(self.default_session.as_str())
    }

    /// Answer a chat message, steered by the session's relevant notes.
    ///
    /// Nothing is logged when the completion fails.
    pub async fn chat(&self, session_id: Option<&str>, message: &str) -> Result<ChatReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AssistantError::InvalidRequest(
                "message is required".to_string(),
            ));
        }
        self.chat_with_history(session_id, &[ChatMessage::user(message)])
            .await
    }

    /// Continue a conversation supplied by the caller.
    ///
    /// Notes are matched against the last user message. The model sees the
    /// system prompt, the notes, then `history` verbatim, and the whole
    /// context is logged.
    pub async fn chat_with_history(
        &self,
        session_id: Option<&str>,
        history: &[ChatMessage],
    ) -> Result<ChatReply> {
        if history.is_empty() {
            return Err(AssistantError::InvalidRequest(
                "message or messages is required".to_string(),
            ));
        }
        let session_id = self.session(session_id);

        let query = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let notes = self
            .memory
            .query_relevant(session_id, query, self.memory_limit);
        let mut messages = prompt::chat_messages(&notes, history);

        debug!(
            session_id,
            notes = notes.len(),
            turns = history.len(),
            model = %self.model,
            "Requesting chat completion"
        );
        let answer = self
            .completer
            .complete(&self.model, &messages)
            .await
            .inspect_err(|e| warn!(session_id, error = %e, "Chat completion failed"))?;

        messages.push(ChatMessage::assistant(answer.clone()));
        self.log_exchange(session_id, &self.model, messages, &notes, "chat", answer)
    }

    /// Describe and scaffold the layout in a design image.
    ///
    /// Uses the session's notes matching "layout" plus any extra instructions.
    pub async fn slice_from_image(
        &self,
        session_id: Option<&str>,
        instructions: &str,
        image: &[u8],
    ) -> Result<ChatReply> {
        if image.is_empty() {
            return Err(AssistantError::InvalidRequest(
                "image is required".to_string(),
            ));
        }
        let session_id = self.session(session_id);

        let notes = self
            .memory
            .query_relevant(session_id, prompt::LAYOUT_QUERY, self.memory_limit);
        let prompt = prompt::slice_prompt(&notes, instructions);

        debug!(session_id, notes = notes.len(), bytes = image.len(), "Requesting layout slice");
        let answer = self
            .completer
            .complete_with_image(&self.vision_model, &prompt, image)
            .await
            .inspect_err(|e| warn!(session_id, error = %e, "Image completion failed"))?;

        let messages = vec![
            ChatMessage::user(prompt),
            ChatMessage::assistant(answer.clone()),
        ];
        self.log_exchange(session_id, &self.vision_model, messages, &notes, "slice", answer)
    }

    fn log_exchange(
        &self,
        session_id: &str,
        model: &str,
        messages: Vec<ChatMessage>,
        notes: &[MemoryNote],
        source: &str,
        answer: String,
    ) -> Result<ChatReply> {
        let used_memory_ids: Vec<NoteId> = notes.iter().map(|n| n.id).collect();
        let record = TranscriptRecord::new(session_id, model, messages, source)
            .with_used_memory_ids(used_memory_ids.clone());
        self.log.append(&record)?;

        info!(message_id = %record.id, session_id, source, "Exchange logged");
        Ok(ChatReply {
            message_id: record.id,
            answer,
            used_memory_ids,
        })
    }

    /// Store a correction or preference for later turns.
    pub fn record_correction(
        &self,
        session_id: Option<&str>,
        draft: MemoryDraft,
    ) -> Result<MemoryNote> {
        let session_id = self.session(session_id);
        Ok(self.memory.append_draft(session_id, draft)?)
    }

    /// Rate a logged exchange.
    pub fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackOutcome> {
        Ok(self.feedback.apply(request)?)
    }
}
