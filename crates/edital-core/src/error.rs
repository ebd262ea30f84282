//! Error types for the edital analysis pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the pipeline's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for edital operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The generative model call failed.
    ///
    /// `status` carries the provider's HTTP status when one was received.
    #[error("Generation error ({}): {message}", status.map(|s| s.to_string()).unwrap_or_else(|| "no status".to_string()))]
    Generation {
        status: Option<u16>,
        message: String,
    },

    /// The model answered, but no JSON object could be recovered from the text.
    #[error("Malformed model response: {message}")]
    MalformedResponse {
        message: String,
        /// Where the raw text was dumped, if the dump succeeded.
        dump_path: Option<PathBuf>,
    },

    /// No file parts were loaded and no textual fallback exists.
    #[error("No usable context: {0}")]
    NoUsableContext(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a generation failure with a provider status.
    pub fn generation(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Generation {
            status,
            message: message.into(),
        }
    }

    /// Provider status code, if this error came from a generation call.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Generation { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
