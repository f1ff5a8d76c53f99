//! Facade-level errors.

use thiserror::Error;
use xorb_core::{DispatchError, HandlerError, XorbError};
use xorb_std::http::HttpError;

/// Errors returned by the application facade.
#[derive(Error, Debug)]
pub enum AppError {
    /// A core operation failed.
    #[error(transparent)]
    Xorb(#[from] XorbError),

    /// The HTTP layer failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Configuration could not be parsed.
    #[error("configuration could not be parsed: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<DispatchError> for AppError {
    fn from(error: DispatchError) -> Self {
        AppError::Xorb(XorbError::Dispatch(error))
    }
}

impl AppError {
    /// The handler error a failed dispatch run raised, if that is what this is.
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            AppError::Xorb(XorbError::Dispatch(error)) => error.handler_error(),
            _ => None,
        }
    }
}
