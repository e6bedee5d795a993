//! Retry policy for structured-output calls
//!
//! Only failures attributable to the generated output (unparseable JSON,
//! schema mismatch) are retried. Transport and provider failures return
//! immediately. On exhaustion the last error is returned unchanged.

use super::error::{LlmError, LlmResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Attempts made by default, including the first one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredOutputRetry {
    /// Total attempts, including the initial one. Never below 1.
    max_attempts: u32,
}

impl Default for StructuredOutputRetry {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl StructuredOutputRetry {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// A policy that makes a single attempt
    pub fn no_retry() -> Self {
        Self::new(1)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether `error`, raised on 1-based `attempt`, earns another attempt
    pub fn should_retry(&self, error: &LlmError, attempt: u32) -> bool {
        attempt < self.max_attempts && error.is_structured_output_error()
    }

    /// Run `operation` until it succeeds or a non-retryable error occurs.
    ///
    /// The closure receives the 1-based attempt number.
    pub fn execute<T, F>(&self, mut operation: F) -> LlmResult<T>
    where
        F: FnMut(u32) -> LlmResult<T>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt) {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Structured output succeeded on attempt {}", attempt);
                    }
                    return Ok(value);
                }
                Err(error) if self.should_retry(&error, attempt) => {
                    warn!(
                        "Structured output attempt {}/{} failed, retrying: {}",
                        attempt, self.max_attempts, error
                    );
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ProviderError;
    use std::cell::Cell;

    fn parse_error() -> LlmError {
        LlmError::Json(serde_json::from_str::<serde_json::Value>("not json").unwrap_err())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(StructuredOutputRetry::default().max_attempts(), 3);
        assert_eq!(StructuredOutputRetry::new(0).max_attempts(), 1);
    }

    #[test]
    fn test_should_retry_logic() {
        let policy = StructuredOutputRetry::new(3);
        let validation = LlmError::Validation("bad".to_string());
        assert!(policy.should_retry(&validation, 1));
        assert!(policy.should_retry(&validation, 2));
        assert!(!policy.should_retry(&validation, 3));

        let transport =
            LlmError::request("OpenAI", "gpt-4", ProviderError::Connection("reset".into()));
        assert!(!policy.should_retry(&transport, 1));
    }

    #[test]
    fn test_recovers_after_parse_failures() {
        let calls = Cell::new(0);
        let result = StructuredOutputRetry::default().execute(|attempt| {
            calls.set(calls.get() + 1);
            if attempt < 3 {
                Err(parse_error())
            } else {
                Ok("ok")
            }
        });
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_exhaustion_returns_last_error_unchanged() {
        let calls = Cell::new(0);
        let result: LlmResult<()> = StructuredOutputRetry::default().execute(|attempt| {
            calls.set(calls.get() + 1);
            Err(LlmError::Validation(format!("attempt {}", attempt)))
        });
        match result {
            Err(LlmError::Validation(message)) => assert_eq!(message, "attempt 3"),
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_transport_errors_not_retried() {
        let calls = Cell::new(0);
        let result: LlmResult<()> = StructuredOutputRetry::default().execute(|_| {
            calls.set(calls.get() + 1);
            Err(LlmError::request("OpenAI", "gpt-4", ProviderError::Timeout("slow".into())))
        });
        assert!(matches!(result, Err(LlmError::Request { .. })));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_transport_error_after_parse_error_stops() {
        let calls = Cell::new(0);
        let result: LlmResult<()> = StructuredOutputRetry::default().execute(|attempt| {
            calls.set(calls.get() + 1);
            if attempt == 1 {
                Err(parse_error())
            } else {
                Err(LlmError::request("OpenAI", "gpt-4", ProviderError::Connection("reset".into())))
            }
        });
        assert!(matches!(result, Err(LlmError::Request { .. })));
        assert_eq!(calls.get(), 2);
    }
}
