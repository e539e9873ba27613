//! Unified error types for the Wiking core
//!
//! Data sources and record stores report failures through [`CoreError`].
//! Higher layers decide whether a failure is fatal: the role graph keeps
//! serving its previous snapshot, the dispatcher turns it into an
//! internal error signal.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type shared by sources and stores
#[derive(Debug, Error)]
pub enum CoreError {
    /// The backing row source could not be read
    #[error("Source error: {0}")]
    Source(String),

    /// A stored value does not have the expected shape
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/Deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a source error
    pub fn source<S: Into<String>>(msg: S) -> Self {
        CoreError::Source(msg.into())
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(msg: S) -> Self {
        CoreError::InvalidData(msg.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        CoreError::Configuration(msg.into())
    }
}
