//! HTTP client error types.

use thiserror::Error;

/// Errors that can occur when calling the storefront platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response (offline, aborted, CORS...).
    #[error("Network error: {0}")]
    Transport(String),

    /// The platform answered outside the 2xx range.
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Failed to encode the request body.
    #[error("JSON error: {0}")]
    Json(String),
}

impl FetchError {
    /// Status code of an HTTP error.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Json(e.to_string())
    }
}
