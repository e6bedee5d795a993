//! Configuration structures with serde support

use super::env::{self, API_KEY_VAR, BASE_URL_VAR, ORGANIZATION_VAR};
use super::secrets::{SafeLogging, SecretString};
use crate::protocol::ModelParams;
use serde::{Deserialize, Serialize};

/// Base URL used when neither the caller nor the environment provides one
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when a config file does not name one
pub const DEFAULT_MODEL_NAME: &str = "gpt-3.5-turbo";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Connection options for a hosted provider.
///
/// Unset fields may be filled from the environment with
/// [`ClientOptions::resolve_with_env`]; nothing is read implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            organization: None,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Options taken entirely from the process environment
    pub fn from_env() -> Self {
        Self::default().resolve_with_env()
    }

    /// Fill unset fields from the process environment
    pub fn resolve_with_env(self) -> Self {
        self.resolve_with(env::process_lookup)
    }

    /// Fill unset fields from `lookup`; explicitly set fields win
    pub fn resolve_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup(API_KEY_VAR).map(SecretString::new);
        }
        if self.organization.is_none() {
            self.organization = lookup(ORGANIZATION_VAR);
        }
        if self.base_url.is_none() {
            self.base_url = lookup(BASE_URL_VAR);
        }
        self
    }

    /// Base URL without a trailing slash
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }
}

impl SafeLogging for ClientOptions {
    fn safe_for_logging(&self) -> String {
        format!(
            "ClientOptions {{ api_key: {}, organization: {:?}, base_url: {}, timeout_secs: {} }}",
            self.api_key
                .as_ref()
                .map(|k| k.partial_redact())
                .unwrap_or_else(|| "[UNSET]".to_string()),
            self.organization,
            self.effective_base_url(),
            self.timeout_secs,
        )
    }
}

/// Declarative description of an LLM client, as found in config files
///
/// ```yaml
/// model_name: gpt-4
/// api_key: ${OPENAI_API_KEY}
/// params:
///   temperature: 0.2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default generation parameters sent with every request
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub params: ModelParams,
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            api_key: None,
            organization: None,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            params: ModelParams::new(),
        }
    }
}

impl LlmConfig {
    /// Connection options described by this config, before env resolution
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_key: self.api_key.clone(),
            organization: self.organization.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}
