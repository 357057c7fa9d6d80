//! Theme error types.

use thiserror::Error;
use turbo_theme_core::ConfigError;
use turbo_theme_data::FetchError;

/// Errors raised while assembling the theme.
#[derive(Error, Debug)]
pub enum ThemeError {
    /// A required runtime capability was not supplied to the context builder.
    #[error("Missing capability: {0}")]
    MissingCapability(&'static str),

    /// Markup a component needs is not on the page.
    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    /// The page turned the component off.
    #[error("Disabled by page: {0}")]
    Disabled(&'static str),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Platform request failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// A quick-add form that cannot be submitted. Never shown to the shopper.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing product id")]
    MissingProductId,
}
