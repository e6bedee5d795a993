//! LLM adapters
//!
//! The [`Llm`] trait is the surface the RAG pipeline talks to. Adapters share
//! the parameter-merge and message-shaping rules in [`base`], translate every
//! provider failure into [`LlmError::Request`], and retry structured calls only
//! when the generated output is malformed.

pub mod base;
mod error;
pub mod openai;
pub mod retry;
pub mod validation;

pub use base::{ChatCompletion, ChatStream, CompletionOptions, FunctionCallOptions, Llm};
pub use error::{LlmError, LlmResult};
pub use openai::OpenAILLM;
pub use retry::StructuredOutputRetry;
