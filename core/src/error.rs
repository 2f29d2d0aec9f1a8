//! Error types for the requester.
//!
//! # Design
//! An HTTP failure (the server answered with status ≥ 400) and a transport
//! failure (no answer at all) are different things to a caller, so they stay
//! different shapes. `SyntheticRequesterError` carries what the server said.
//! A transport failure keeps the transport's own error object untouched so it
//! can be downcast to the concrete type.

use thiserror::Error;

use crate::types::ResponseBody;

/// Error produced by a `Transport`, kept as the original boxed error.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The server answered with a status code of 400 or above.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntheticRequesterError {
    /// Status message for the response's status code, empty when unknown.
    ///
    /// This is the canonical reason phrase (`404` gives `"Not Found"`). A
    /// custom phrase sent by the server, such as `404 Widget Gone`, is not
    /// available from the HTTP stack and is not reported.
    pub message: String,
    pub status: u16,
    /// Parsed (or raw) body that came with the failing status.
    pub request: ResponseBody,
}

impl SyntheticRequesterError {
    pub fn name(&self) -> &'static str {
        "RequesterError"
    }
}

/// Errors returned by `SyntheticRequester`.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Status(#[from] SyntheticRequesterError),

    /// Connection-level failure, passed through unchanged.
    #[error(transparent)]
    Transport(TransportError),

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported HTTP method {0:?}")]
    UnsupportedMethod(String),

    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RequestError {
    /// The HTTP-level error, if the server answered with a failing status.
    pub fn status_error(&self) -> Option<&SyntheticRequesterError> {
        match self {
            RequestError::Status(err) => Some(err),
            _ => None,
        }
    }

    /// The underlying transport error, if no response was received.
    pub fn transport_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            RequestError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
