//! Errors surfaced by LLM adapters

use crate::config::ConfigError;
use crate::http::{describe_provider_error, ProviderError};
use thiserror::Error;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Invalid construction arguments
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider connection could not be set up
    #[error("{0}")]
    Connection(String),

    /// Any provider failure during a live call
    #[error(
        "Failed to use {provider}'s {model} model for chat completion. Underlying Error:\n{message}"
    )]
    Request {
        provider: String,
        model: String,
        message: String,
        #[source]
        source: ProviderError,
    },

    /// Function call arguments were not valid JSON
    #[error("Failed to parse function call arguments: {0}")]
    Json(#[source] serde_json::Error),

    /// Function call arguments did not match the declared schema
    #[error("Function call arguments failed schema validation: {0}")]
    Validation(String),

    /// The provider answered, but without the structure the call requires
    #[error("Unexpected provider response: {0}")]
    UnexpectedResponse(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LlmError {
    /// Translate a provider error into the uniform request failure
    pub fn request(
        provider: impl Into<String>,
        model: impl Into<String>,
        source: ProviderError,
    ) -> Self {
        LlmError::Request {
            provider: provider.into(),
            model: model.into(),
            message: describe_provider_error(&source),
            source,
        }
    }

    /// Errors caused by the shape of generated output rather than transport
    pub fn is_structured_output_error(&self) -> bool {
        matches!(self, LlmError::Json(_) | LlmError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_message_layout() {
        let err = LlmError::request(
            "OpenAI",
            "gpt-4",
            ProviderError::Status {
                status: 404,
                body: r#"{"error": {"message": "The model does not exist"}}"#.to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Failed to use OpenAI's gpt-4 model for chat completion. \
             Underlying Error:\nThe model does not exist"
        );
    }

    #[test]
    fn test_structured_output_classification() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(LlmError::Json(json_err).is_structured_output_error());
        assert!(LlmError::Validation("missing queries".to_string()).is_structured_output_error());
        assert!(!LlmError::NotImplemented("achat_completion").is_structured_output_error());
        assert!(!LlmError::request("OpenAI", "gpt-4", ProviderError::Timeout("30s".to_string()))
            .is_structured_output_error());
    }
}
