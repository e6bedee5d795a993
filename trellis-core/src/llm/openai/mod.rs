//! OpenAI provider implementation
//!
//! Adapter for the OpenAI chat completions API, translating between the
//! protocol types and OpenAI's wire format.

mod client;
pub mod converter;
pub mod streaming;
pub mod types;

pub use client::OpenAILLM;
pub use streaming::SseChunkStream;
pub use types::{OpenAIRequest, OpenAIResponse, OpenAIStreamChunk};
