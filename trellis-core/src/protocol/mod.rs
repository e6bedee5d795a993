//! Protocol module for chat request/response structures
//!
//! Provider-agnostic data models shared by every LLM adapter:
//! - chat messages and conversation history
//! - retrieved context blocks
//! - function declarations for structured output
//! - typed responses and streaming chunks

pub mod context;
pub mod function;
pub mod types;

pub use context::{
    Context, ContextContent, ContextQueryResult, ContextQueryResults, ContextSnippet,
    StringContextContent,
};
pub use function::{Function, FunctionParameters, FunctionProperty};
pub use types::{
    ChatResponse, Choice, ChunkDelta, Message, Messages, Role, StreamChoice, StreamingChatChunk,
    TokenCounts,
};

/// Generation options keyed by provider parameter name
pub type ModelParams = serde_json::Map<String, serde_json::Value>;
