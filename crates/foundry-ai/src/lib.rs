//! LLM provider surface: request/response types and the Gemini client.
mod gemini;
mod types;

pub use gemini::{GeminiClient, GeminiConfig};
pub use types::{
    AiError, AnswerContent, AnswerFragment, ChatRequest, ChatResponse, ChatUsage, LlmClient,
    Message, MessageRole,
};
