pub mod config;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod session;

pub use error::{ChatError, Error, ExtractError, Result, SessionError};
pub use extractor::ContentSource;
pub use llm::{ChatModel, GeminiClient};
pub use session::{ChatSession, ConversationTurn};
