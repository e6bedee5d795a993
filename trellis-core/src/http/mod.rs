//! HTTP layer for talking to hosted LLM providers
//!
//! This module implements the blocking transport used by the adapters:
//! - the [`HttpTransport`] seam adapters are written against
//! - a reqwest-backed [`HttpClient`](client::HttpClient)
//! - error mapping and message extraction

pub mod client;
pub mod error;

pub use client::HttpClient;
pub use error::{describe_provider_error, ProviderError};

use serde_json::Value;
use std::io::BufRead;

/// Provider endpoint being called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Chat completion request
    ChatCompletions,
    /// Model listing
    Models,
}

impl Endpoint {
    /// Path relative to the provider's base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ChatCompletions => "/chat/completions",
            Endpoint::Models => "/models",
        }
    }
}

/// Readable body of a streaming response, consumed line by line
pub type StreamBody = Box<dyn BufRead + Send>;

/// Blocking transport the adapters issue requests through
pub trait HttpTransport: Send + Sync {
    /// GET a JSON document
    fn get_json(&self, endpoint: Endpoint) -> Result<Value, ProviderError>;

    /// POST a JSON body and wait for the full JSON response
    fn post_json(&self, endpoint: Endpoint, body: &Value) -> Result<Value, ProviderError>;

    /// POST a JSON body and hand back the response body unread
    fn post_stream(&self, endpoint: Endpoint, body: &Value) -> Result<StreamBody, ProviderError>;
}
