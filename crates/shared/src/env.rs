//! Environment backed configuration helpers.
//!

use core::{fmt::Display, str::FromStr};
use std::collections::HashMap;

use thiserror::Error;

/// A source of configuration values keyed by variable name.
pub trait Lookup {
    /// Get the value for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
}

/// The environment of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Lookup for ProcessEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Lookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        Self::get(self, key).cloned()
    }
}

/// Get a value, treating an empty value as unset.
pub fn optional(lookup: &impl Lookup, key: &str) -> Option<String> {
    lookup.get(key).filter(|value| !value.trim().is_empty())
}

/// Get a value or fall back to `default`.
pub fn string_or(lookup: &impl Lookup, key: &str, default: &str) -> String {
    optional(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get a value that must be present.
pub fn required(lookup: &impl Lookup, key: &str) -> Result<String, ConfigError> {
    optional(lookup, key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Parse a value or fall back to `default` when unset.
pub fn parse_or<T>(lookup: &impl Lookup, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(value) = optional(lookup, key) else {
        return Ok(default);
    };

    value
        .trim()
        .parse()
        .map_err(|error: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            value,
            reason: error.to_string(),
        })
}

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}
