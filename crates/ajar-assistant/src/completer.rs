//! Completion backend abstraction.
//!
//! The assistant only needs "messages in, text out" (plus an image variant for
//! layout slicing); provider clients implement [`Completer`].

use std::sync::{Arc, Mutex};

use ajar_types::ChatMessage;
use async_trait::async_trait;

/// Errors a completion backend may report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// The backend could not be reached or did not produce an answer.
    #[error("completion backend unavailable: {0}")]
    Unavailable(String),

    /// The backend does not accept image input.
    #[error("backend '{0}' does not support image input")]
    Unsupported(String),
}

pub type CompletionResult<T> = std::result::Result<T, CompletionError>;

/// A model that turns a conversation into a reply.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Complete a text conversation.
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> CompletionResult<String>;

    /// Complete a single prompt about an image.
    async fn complete_with_image(
        &self,
        model: &str,
        prompt: &str,
        image: &[u8],
    ) -> CompletionResult<String> {
        let _ = (model, prompt, image);
        Err(CompletionError::Unsupported(self.name().to_string()))
    }

    /// Get the name of this backend.
    fn name(&self) -> &str;
}

/// A completer that can be shared across threads.
pub type SharedCompleter = Arc<dyn Completer>;

/// A request received by [`MockCompleter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub image_len: Option<usize>,
}

/// Mock completer for testing.
///
/// Replies are returned in order; once they run out every call fails with
/// [`CompletionError::Unavailable`].
#[derive(Debug, Default)]
pub struct MockCompleter {
    replies: Mutex<Vec<String>>,
    request_log: Mutex<Vec<RecordedRequest>>,
    vision: bool,
}

impl MockCompleter {
    /// Create a mock returning `replies` in order.
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies),
            ..Default::default()
        }
    }

    /// Create a mock with a single text reply.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()])
    }

    /// Create a mock that always fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Accept image requests too.
    pub fn with_vision(mut self) -> Self {
        self.vision = true;
        self
    }

    /// All requests made so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.request_log.lock().unwrap().clone()
    }

    fn next_reply(&self, request: RecordedRequest) -> CompletionResult<String> {
        self.request_log.lock().unwrap().push(request);
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(CompletionError::Unavailable(
                "MockCompleter: no more replies available".to_string(),
            ));
        }
        Ok(replies.remove(0))
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> CompletionResult<String> {
        self.next_reply(RecordedRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            image_len: None,
        })
    }

    async fn complete_with_image(
        &self,
        model: &str,
        prompt: &str,
        image: &[u8],
    ) -> CompletionResult<String> {
        if !self.vision {
            return Err(CompletionError::Unsupported(self.name().to_string()));
        }
        self.next_reply(RecordedRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user(prompt)],
            image_len: Some(image.len()),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replies_in_order_then_fails() {
        let mock = MockCompleter::new(vec!["one".into(), "two".into()]);
        let msgs = [ChatMessage::user("hi")];

        assert_eq!(mock.complete("m", &msgs).await.unwrap(), "one");
        assert_eq!(mock.complete("m", &msgs).await.unwrap(), "two");
        assert!(matches!(
            mock.complete("m", &msgs).await,
            Err(CompletionError::Unavailable(_))
        ));
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_image_requires_vision() {
        let mock = MockCompleter::with_text("layout");
        let err = mock.complete_with_image("v", "p", b"png").await.unwrap_err();
        assert_eq!(err, CompletionError::Unsupported("mock".to_string()));

        let mock = MockCompleter::with_text("layout").with_vision();
        assert_eq!(
            mock.complete_with_image("v", "p", b"png").await.unwrap(),
            "layout"
        );
        assert_eq!(mock.requests()[0].image_len, Some(3));
    }
}
