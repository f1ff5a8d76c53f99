//! # Dispatch Handler
//!
//! The unit of work a namespace contributes to a dispatch run. A handler
//! receives four things:
//!
//! 1. the [`DispatchContext`] of the run,
//! 2. the error the previous handler passed to its continuation, if any,
//! 3. the continuation [`Next`] it must call to advance the run,
//! 4. the payload the previous handler passed forward
//!    (`Data::Null` when none was given).
//!
//! # Usage Patterns
//!
//! 1. **Closure**: `handler_fn(|ctx, err, next, data| next.proceed())`
//! 2. **Struct implementation**: `impl Handler for MyHandler`

use crate::{Data, context::DispatchContext, error::HandlerError, next::Next};
use std::sync::Arc;

/// A unit of dispatch logic.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a dispatch handler",
    label = "missing `Handler` implementation",
    note = "Wrap closures with `handler_fn` or implement `Handler::handle`."
)]
pub trait Handler: Send + Sync + 'static {
    /// Run the handler. Call `next` to let the run continue.
    fn handle(&self, ctx: &DispatchContext, error: Option<HandlerError>, next: Next, data: Data);
}

/// A shared, type-erased handler as stored in namespace tables.
pub type SharedHandler = Arc<dyn Handler>;

/// A [`Handler`] backed by a closure. Built with [`handler_fn`].
pub struct HandlerFn<F> {
    func: F,
}

/// Turn a closure into a [`Handler`].
///
/// ```rust,ignore
/// let h = handler_fn(|_ctx, _err, next, _data| next.send(json!(42)));
/// ```
pub fn handler_fn<F>(func: F) -> HandlerFn<F>
where
    F: Fn(&DispatchContext, Option<HandlerError>, Next, Data) + Send + Sync + 'static,
{
    HandlerFn { func }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&DispatchContext, Option<HandlerError>, Next, Data) + Send + Sync + 'static,
{
    fn handle(&self, ctx: &DispatchContext, error: Option<HandlerError>, next: Next, data: Data) {
        (self.func)(ctx, error, next, data)
    }
}

/// One handler or several, as accepted by namespace registration.
pub enum Callbacks {
    /// A single handler.
    One(SharedHandler),
    /// An ordered list of handlers.
    Many(Vec<SharedHandler>),
}

impl Callbacks {
    /// Wrap a single handler.
    pub fn one<H: Handler>(handler: H) -> Self {
        Callbacks::One(Arc::new(handler))
    }

    /// Flatten into the ordered list of handlers.
    pub fn into_vec(self) -> Vec<SharedHandler> {
        match self {
            Callbacks::One(handler) => vec![handler],
            Callbacks::Many(handlers) => handlers,
        }
    }

    /// Number of handlers carried.
    pub fn len(&self) -> usize {
        match self {
            Callbacks::One(_) => 1,
            Callbacks::Many(handlers) => handlers.len(),
        }
    }

    /// Whether no handler is carried.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<SharedHandler> for Callbacks {
    fn from(handler: SharedHandler) -> Self {
        Callbacks::One(handler)
    }
}

impl From<Vec<SharedHandler>> for Callbacks {
    fn from(handlers: Vec<SharedHandler>) -> Self {
        Callbacks::Many(handlers)
    }
}
