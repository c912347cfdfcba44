//! Error types for fence-bom-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fence-bom-core
#[derive(Debug, Error)]
pub enum Error {
    /// Unrecognized rounding level string
    #[error("Unknown rounding level: {0}")]
    UnknownRoundingLevel(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
