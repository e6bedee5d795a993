//! Environment lookups for client options and config files
//!
//! Every function takes a lookup closure so callers (and tests) decide where
//! values come from. [`process_lookup`] reads the real environment.

use super::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the organization id
pub const ORGANIZATION_VAR: &str = "OPENAI_ORG_ID";
/// Environment variable overriding the API base URL
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
});

/// Reads a variable from the process environment, treating empty as unset
pub fn process_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Replace every `${VAR}` reference in `content`.
///
/// Fails on the first variable the lookup cannot resolve.
pub fn interpolate_with<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = None;
    let result = ENV_VAR_PATTERN.replace_all(content, |cap: &regex::Captures<'_>| {
        let var_name = &cap[1];
        match lookup(var_name) {
            Some(value) => value,
            None => {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var) => Err(ConfigError::EnvVarNotFound { var }),
        None => Ok(result.into_owned()),
    }
}

/// [`interpolate_with`] against the process environment
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    interpolate_with(content, process_lookup)
}
