//! Errors of the HTTP convenience layer.

use thiserror::Error;

/// A failure reported by a [`Transport`](super::Transport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    /// Create a transport error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised by the HTTP client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The verb is not one of GET, HEAD, DELETE, POST, PUT, PATCH.
    #[error("the request method {0} is not supported")]
    UnsupportedMethod(String),

    /// The transport failed to deliver the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A script could not be loaded.
    #[error("script could not be fetched: {url}")]
    ScriptLoad {
        /// The URL that was requested.
        url: String,
        /// What the transport reported.
        #[source]
        source: TransportError,
    },

    /// The response body could not be decoded.
    #[error("response body could not be decoded: {0}")]
    Decode(String),

    /// The request body could not be encoded.
    #[error("request body could not be encoded: {0}")]
    Encode(String),
}
