//! Error types for chatstats core functionality.

use thiserror::Error;

/// Main error type for chatstats core.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON or a message shape the model does not accept.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Malformed configuration file.
    #[error("Data parsing error: {0}")]
    Parse(String),
}

/// Result type for chatstats core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true when the error is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}
