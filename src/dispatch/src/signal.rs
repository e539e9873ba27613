//! Handler outcomes
//!
//! A handler returns either a [`Response`] or a [`ControlSignal`].
//! Signals travel through every forwarding frame untouched (`?`) and are
//! only turned into a transport response at the outer boundary.

use serde::Serialize;
use thiserror::Error;
use wiking_core::CoreError;

/// Control-flow signal raised by a handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlSignal {
    /// Re-issue the request at another URI
    #[error("Redirect to {uri}")]
    Redirect { uri: String, permanent: bool },

    /// Path segment matches nothing
    #[error("Not found")]
    NotFound,

    /// Target exists but the caller may not access it
    #[error("Forbidden")]
    Forbidden,

    /// Target needs a logged-in user and there is none
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Structurally invalid path segment or parameter
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Failure of a backing store or misconfiguration
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ControlSignal {
    pub fn redirect(uri: impl Into<String>) -> Self {
        ControlSignal::Redirect {
            uri: uri.into(),
            permanent: false,
        }
    }

    pub fn permanent_redirect(uri: impl Into<String>) -> Self {
        ControlSignal::Redirect {
            uri: uri.into(),
            permanent: true,
        }
    }
}

impl From<CoreError> for ControlSignal {
    fn from(err: CoreError) -> Self {
        ControlSignal::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ControlSignal {
    fn from(err: serde_json::Error) -> Self {
        ControlSignal::Internal(err.to_string())
    }
}

/// Content produced by a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub content_type: String,
    pub body: String,
}

impl Response {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ControlSignal> {
        Ok(Self {
            content_type: "application/json".to_string(),
            body: serde_json::to_string(value)?,
        })
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self {
            content_type: "text/plain; charset=utf-8".to_string(),
            body: body.into(),
        }
    }
}

/// Result of handling (part of) a request
pub type HandlerResult = Result<Response, ControlSignal>;
