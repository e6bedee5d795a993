//! Credential handling and log-safe rendering

use serde::{Deserialize, Serialize};
use std::fmt;

/// An API key or other credential that must never reach logs verbatim
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw value, for building request headers only
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Short recognizable form such as `sk-...cdef`
    pub fn partial_redact(&self) -> String {
        let len = self.0.chars().count();
        if len == 0 {
            return "[EMPTY]".to_string();
        }
        if len <= 8 {
            return "[REDACTED]".to_string();
        }

        let head: String = if self.0.starts_with("sk-") {
            self.0.chars().take(3).collect()
        } else {
            self.0.chars().take(2).collect()
        };
        let tail: String = self.0.chars().skip(len - 4).collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Types that can describe themselves without leaking credentials
pub trait SafeLogging {
    fn safe_for_logging(&self) -> String;
}
