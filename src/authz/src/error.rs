//! Error types for the authorization crate

use thiserror::Error;
use wiking_core::CoreError;

/// Authorization errors
///
/// None of these ever escape the authorization gate: a failure to
/// authenticate is treated as an anonymous caller, and role graph
/// source failures keep the previous snapshot in service.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Credentials were presented but rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backing source error
    #[error("Source error: {0}")]
    Source(#[from] CoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
