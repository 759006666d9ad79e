pub mod gemini;
pub mod r#trait;

pub use gemini::{GeminiClient, ModelInfo};
pub use r#trait::ChatModel;
