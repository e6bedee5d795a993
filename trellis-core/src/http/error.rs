//! Transport-level errors and message extraction

use serde_json::Value;
use thiserror::Error;

/// Failures reported by an [`HttpTransport`](super::HttpTransport)
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider could not be reached or the connection broke
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The response body was not what the endpoint promises
    #[error("Failed to decode response: {message}")]
    Decode { message: String, body: String },

    /// The transport could not be built from the given options
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Raw response body, when the provider sent one
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ProviderError::Status { body, .. } | ProviderError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_builder() {
            ProviderError::Configuration(err.to_string())
        } else {
            ProviderError::Connection(err.to_string())
        }
    }
}

/// Best-effort human readable text for a provider error.
///
/// Prefers `error.message` from a JSON body, then a top-level `message`,
/// and falls back to the error's own display text.
pub fn describe_provider_error(err: &ProviderError) -> String {
    err.response_body()
        .and_then(|body| serde_json::from_str::<Value>(body).ok())
        .and_then(|json| extract_message(&json))
        .unwrap_or_else(|| err.to_string())
}

fn extract_message(json: &Value) -> Option<String> {
    // { "error": { "message": "..." } }; an "error" without a message falls back
    if let Some(error) = json.get("error") {
        return error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
    }

    json.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
