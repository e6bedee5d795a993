//! Trellis Core Library
//!
//! Adapters that let a retrieval-augmented generation pipeline talk to hosted
//! chat models: message formatting, parameter merging, structured function
//! calls with schema validation, and uniform error reporting.

pub mod config;
pub mod http;
pub mod llm;
pub mod protocol;

pub use config::{ClientOptions, LlmConfig};
pub use llm::{
    ChatCompletion, ChatStream, CompletionOptions, FunctionCallOptions, Llm, LlmError, LlmResult,
    OpenAILLM,
};
pub use protocol::{Context, Function, Message, ModelParams};

/// Returns the version of the Trellis Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
