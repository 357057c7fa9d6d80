//! Configuration error types.

use thiserror::Error;

/// Errors raised while parsing or validating theme configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A route the theme needs is empty.
    #[error("Missing route: {0}")]
    MissingRoute(&'static str),

    /// A field holds a value outside its accepted range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// The configuration document could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
