//! # Continuation (Next)
//!
//! Every handler of a dispatch run receives a [`Next`]. Calling it is the
//! only way to advance the run: a handler may call it before returning, or
//! hold on to it and call it later once some asynchronous work settles.
//! A handler that never calls it stalls the run for good.

use crate::{Data, error::HandlerError};
use std::sync::Arc;

/// The back end a [`Next`] drives.
///
/// Implemented by the dispatch runner. Handlers never see this trait
/// directly; they go through [`Next`].
pub trait Advance: Send + Sync + 'static {
    /// Record `error` (if any) and run the next handler with `data`.
    fn advance(&self, error: Option<HandlerError>, data: Option<Data>);
}

/// The continuation passed to every handler.
///
/// Cheap to clone; every clone drives the same run.
#[derive(Clone)]
pub struct Next {
    inner: Arc<dyn Advance>,
}

impl Next {
    /// Wrap a dispatch back end.
    pub fn new(inner: Arc<dyn Advance>) -> Self {
        Self { inner }
    }

    /// Advance with an optional error and an optional payload.
    pub fn call(&self, error: Option<HandlerError>, data: Option<Data>) {
        self.inner.advance(error, data);
    }

    /// Advance with neither error nor payload.
    pub fn proceed(&self) {
        self.inner.advance(None, None);
    }

    /// Advance carrying `data` to the next handler.
    pub fn send(&self, data: Data) {
        self.inner.advance(None, Some(data));
    }

    /// Advance reporting `error`. The run keeps going.
    pub fn fail(&self, error: HandlerError) {
        self.inner.advance(Some(error), None);
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}
