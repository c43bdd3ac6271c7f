use std::env;
use std::str::FromStr;

use super::types::{ConfigError, Environment};

const DEFAULT_CORS_ORIGINS: &[&str] =
    &["http://localhost:5173", "http://localhost:3000", "http://localhost:8080"];

/// Trimmed value of `key`; unset and blank are the same thing.
pub(super) fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

pub(super) fn env_number<T: FromStr>(
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env_optional(key) {
        Some(raw) => parse_number(key, raw),
        None => Ok(default),
    }
}

fn parse_number<T: FromStr>(field: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::InvalidValue { field, value: raw })
}

pub(super) fn env_flag(key: &str) -> bool {
    env_optional(key).is_some_and(|value| is_truthy(&value))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Accepts a JSON array or a comma separated list. Nothing usable means the local
/// development origins.
pub(super) fn parse_cors_origins(value: Option<String>) -> Result<Vec<String>, ConfigError> {
    let origins = match value.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) if raw.starts_with('[') => serde_json::from_str::<Vec<String>>(raw)
            .map_err(|_| ConfigError::InvalidCors(raw.to_string()))?,
        Some(raw) => raw.split(',').map(str::trim).map(str::to_string).collect(),
    };

    let origins: Vec<String> = origins.into_iter().filter(|origin| !origin.is_empty()).collect();
    if origins.is_empty() {
        return Ok(DEFAULT_CORS_ORIGINS.iter().map(|origin| origin.to_string()).collect());
    }
    Ok(origins)
}

pub(super) fn parse_environment(value: Option<String>) -> Environment {
    let Some(label) = value.map(|raw| raw.to_ascii_lowercase()) else {
        return Environment::Development;
    };

    match label.as_str() {
        "production" | "prod" => Environment::Production,
        "staging" => Environment::Staging,
        "test" | "testing" => Environment::Test,
        _ => Environment::Development,
    }
}
