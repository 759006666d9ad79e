use crate::error::ChatError;

/// Trait for chat backends that answer questions about a text context
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Answer a question using the given context.
    /// Context and question are combined into one prompt; the reply is
    /// returned verbatim.
    async fn answer(&self, context: &str, question: &str) -> Result<String, ChatError>;
}
