use crate::error::{ChatError, Result, SessionError};
use crate::llm::ChatModel;
use tracing::debug;

/// Answer recorded when the model replies without any candidate text
pub const NO_ANSWER_PLACEHOLDER: &str = "No answer returned.";

/// One question/answer exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

/// In-memory conversation state: one loaded context plus the turns asked about it.
/// History entries always refer to the currently loaded context; replacing the
/// context starts a fresh history.
#[derive(Debug, Default)]
pub struct ChatSession {
    context: Option<String>,
    history: Vec<ConversationTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored context wholesale and clear the history.
    /// Whitespace-only text is rejected and leaves the previous state in place.
    pub fn load_context(&mut self, text: String) -> std::result::Result<(), SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyExtraction);
        }
        debug!(chars = text.len(), "context replaced, history cleared");
        self.context = Some(text);
        self.history.clear();
        Ok(())
    }

    /// Ask one question about the loaded context.
    ///
    /// The turn is appended to the history on success. A reply without
    /// candidate text is recorded with a placeholder answer so the
    /// conversation can continue; any other failure propagates and leaves
    /// the history untouched.
    pub async fn ask(&mut self, model: &dyn ChatModel, question: &str) -> Result<ConversationTurn> {
        let context = self.context.as_deref().ok_or(SessionError::NoContext)?;

        let answer = match model.answer(context, question).await {
            Ok(answer) => answer,
            Err(ChatError::NoCandidate) => NO_ANSWER_PLACEHOLDER.to_string(),
            Err(e) => return Err(e.into()),
        };

        let turn = ConversationTurn {
            question: question.to_string(),
            answer,
        };
        self.history.push(turn.clone());
        Ok(turn)
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn turn_count(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct EchoModel;

    #[async_trait::async_trait]
    impl ChatModel for EchoModel {
        async fn answer(&self, context: &str, question: &str) -> std::result::Result<String, ChatError> {
            Ok(format!("{} | {}", context, question))
        }
    }

    struct FailingModel;

    #[async_trait::async_trait]
    impl ChatModel for FailingModel {
        async fn answer(&self, _: &str, _: &str) -> std::result::Result<String, ChatError> {
            Err(ChatError::Http {
                status: 500,
                body: "internal".to_string(),
            })
        }
    }

    struct NoCandidateModel;

    #[async_trait::async_trait]
    impl ChatModel for NoCandidateModel {
        async fn answer(&self, _: &str, _: &str) -> std::result::Result<String, ChatError> {
            Err(ChatError::NoCandidate)
        }
    }

    #[test]
    fn test_load_context_rejects_blank_text() {
        let mut session = ChatSession::new();
        assert!(matches!(
            session.load_context("   \n  ".to_string()),
            Err(SessionError::EmptyExtraction)
        ));
        assert!(!session.has_context());
    }

    #[test]
    fn test_failed_load_keeps_previous_context() {
        let mut session = ChatSession::new();
        session.load_context("original".to_string()).unwrap();
        assert!(session.load_context("".to_string()).is_err());
        assert_eq!(session.context(), Some("original"));
    }

    #[tokio::test]
    async fn test_ask_requires_context() {
        let mut session = ChatSession::new();
        let err = session.ask(&EchoModel, "anything?").await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NoContext)));
    }

    #[tokio::test]
    async fn test_ask_appends_turn() {
        let mut session = ChatSession::new();
        session.load_context("the context".to_string()).unwrap();

        let turn = session.ask(&EchoModel, "the question?").await.unwrap();
        assert_eq!(turn.answer, "the context | the question?");
        assert_eq!(session.turn_count(), 1);
        assert_eq!(session.history()[0], turn);
    }

    #[tokio::test]
    async fn test_loading_new_context_clears_history() {
        let mut session = ChatSession::new();
        session.load_context("context A".to_string()).unwrap();
        session.ask(&EchoModel, "about A?").await.unwrap();
        assert_eq!(session.turn_count(), 1);

        session.load_context("context B".to_string()).unwrap();
        assert_eq!(session.turn_count(), 0);
        assert_eq!(session.context(), Some("context B"));
    }

    #[tokio::test]
    async fn test_failed_ask_leaves_history_untouched() {
        let mut session = ChatSession::new();
        session.load_context("ctx".to_string()).unwrap();

        let err = session.ask(&FailingModel, "q?").await.unwrap_err();
        assert!(matches!(err, Error::Chat(ChatError::Http { status: 500, .. })));
        assert_eq!(session.turn_count(), 0);

        // The session stays usable after a failed call
        session.ask(&EchoModel, "again?").await.unwrap();
        assert_eq!(session.turn_count(), 1);
    }

    #[tokio::test]
    async fn test_candidate_less_reply_records_placeholder() {
        let mut session = ChatSession::new();
        session.load_context("ctx".to_string()).unwrap();

        let turn = session.ask(&NoCandidateModel, "q?").await.unwrap();
        assert_eq!(turn.answer, NO_ANSWER_PLACEHOLDER);
        assert_eq!(session.turn_count(), 1);
    }
}
