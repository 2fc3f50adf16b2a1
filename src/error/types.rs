//! Error type definitions
//!
//! Defines the main error types used throughout the crawler. Login liveness
//! is deliberately not represented here: the platform clients expose it as a
//! boolean probe (`pong`) that swallows transport failures.

use thiserror::Error;

/// Main error type for the crawler
#[derive(Error, Debug)]
pub enum Error {
    /// Platform reported a non-success result, carries the platform message
    #[error("API error: {message}")]
    Api { message: String },

    /// Request signing failures (missing WBI keys, unknown template)
    #[error("Signing error: {0}")]
    Signing(String),

    /// Media byte fetch failed or returned an empty body
    #[error("Download error for {url}: {reason}")]
    Download { url: String, reason: String },

    /// External assembly tool failed (non-zero exit, missing inputs)
    #[error("Assembly error: {detail}")]
    Assembly { detail: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP client errors (timeout, connection reset)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new API error with the platform-reported message
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new signing error
    pub fn signing(msg: impl Into<String>) -> Self {
        Self::Signing(msg.into())
    }

    /// Create a download error
    pub fn download(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an assembly error
    pub fn assembly(detail: impl Into<String>) -> Self {
        Self::Assembly {
            detail: detail.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
