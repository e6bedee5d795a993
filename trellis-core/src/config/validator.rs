//! Configuration validation

use super::error::{ConfigError, ConfigResult};
use super::schema::{ClientOptions, LlmConfig};
use crate::protocol::ModelParams;
use url::Url;

/// Parameter key reserved for the explicit model name
pub const RESERVED_MODEL_KEY: &str = "model";

/// Checks applied to configs before any client is built
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, config: &LlmConfig) -> ConfigResult<()> {
        if config.model_name.trim().is_empty() {
            return Err(ConfigError::invalid("model_name", "model name must not be empty"));
        }
        self.validate_params(&config.params)?;
        self.validate_options(&config.client_options())
    }

    /// Default params must not name the model
    pub fn validate_params(&self, params: &ModelParams) -> ConfigResult<()> {
        if params.contains_key(RESERVED_MODEL_KEY) {
            return Err(ConfigError::invalid(
                "params.model",
                "The 'model' parameter is not allowed in the default model params. \
                 Please use the 'model_name' argument instead.",
            ));
        }
        Ok(())
    }

    pub fn validate_options(&self, options: &ClientOptions) -> ConfigResult<()> {
        if let Some(base_url) = &options.base_url {
            let parsed = Url::parse(base_url)
                .map_err(|e| ConfigError::invalid("base_url", format!("{}: {}", base_url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::invalid(
                    "base_url",
                    format!("unsupported scheme '{}'", parsed.scheme()),
                ));
            }
        }
        if options.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "timeout must be positive"));
        }
        Ok(())
    }
}
