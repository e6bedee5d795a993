//! Configuration module
//!
//! Client options, credential handling and loading of LLM configs from YAML
//! or JSON files with `${VAR}` environment interpolation.

pub mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use error::{ConfigError, ConfigResult};
pub use schema::{
    ClientOptions, LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL_NAME, DEFAULT_TIMEOUT_SECS,
};
pub use secrets::{SafeLogging, SecretString};
pub use validator::{ConfigValidator, RESERVED_MODEL_KEY};

use std::fs;
use std::path::Path;

/// Parse a YAML config from a string, interpolating with `lookup`
pub fn from_yaml_str_with<F>(content: &str, lookup: F) -> ConfigResult<LlmConfig>
where
    F: Fn(&str) -> Option<String>,
{
    parse_yaml("<string>", content, lookup)
}

/// Parse a YAML config from a string, interpolating from the process environment
pub fn from_yaml_str(content: &str) -> ConfigResult<LlmConfig> {
    from_yaml_str_with(content, env::process_lookup)
}

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<LlmConfig> {
    let path = path.as_ref();
    let content = read(path)?;
    parse_yaml(&path.to_string_lossy(), &content, env::process_lookup)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<LlmConfig> {
    let path = path.as_ref();
    let content = read(path)?;
    let interpolated = env::interpolate_env_vars(&content)?;

    let config: LlmConfig =
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

fn read(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

fn parse_yaml<F>(origin: &str, content: &str, lookup: F) -> ConfigResult<LlmConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let interpolated = env::interpolate_with(content, lookup)?;

    let config: LlmConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
model_name: gpt-4
api_key: ${TRELLIS_TEST_KEY}
base_url: https://api.openai.com/v1
params:
  temperature: 0.2
  top_p: 1.0
"#;
        let lookup = |name: &str| (name == "TRELLIS_TEST_KEY").then(|| "sk-test".to_string());
        let config = from_yaml_str_with(yaml, lookup).unwrap();

        assert_eq!(config.model_name, "gpt-4");
        assert_eq!(config.api_key.unwrap().expose_secret(), "sk-test");
        assert_eq!(config.params.len(), 2);
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let result = from_yaml_str_with("model_nam: gpt-4", |_| None);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
