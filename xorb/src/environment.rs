//! The hosting environment.
//!
//! An application reads two things from its host: the current path, once
//! per [`App::init`](crate::App::init), and a one-time "document ready"
//! signal that gates the dispatch run.

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, BoxFuture, Shared};

/// What the application needs from its host.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot host an application",
    label = "missing `Environment` implementation",
    note = "Use `StaticEnvironment` for fixed paths and tests."
)]
pub trait Environment: Send + Sync + 'static {
    /// The active path.
    fn current_path(&self) -> String;

    /// Resolves once the hosting document has finished loading.
    ///
    /// Resolves immediately when it already has.
    fn document_ready(&self) -> BoxFuture<'static, ()>;
}

/// An environment with a fixed path.
pub struct StaticEnvironment {
    path: String,
    ready: Option<Shared<oneshot::Receiver<()>>>,
}

/// Fires the ready signal of a deferred [`StaticEnvironment`].
///
/// Dropping it unfired also releases waiters.
pub struct DocumentReady {
    sender: oneshot::Sender<()>,
}

impl DocumentReady {
    /// Signal that the document has finished loading.
    pub fn fire(self) {
        let _ = self.sender.send(());
    }
}

impl StaticEnvironment {
    /// An environment whose document has already loaded.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ready: None,
        }
    }

    /// An environment whose document is still loading.
    pub fn deferred(path: impl Into<String>) -> (Self, DocumentReady) {
        let (sender, receiver) = oneshot::channel();
        let environment = Self {
            path: path.into(),
            ready: Some(receiver.shared()),
        };
        (environment, DocumentReady { sender })
    }
}

impl Environment for StaticEnvironment {
    fn current_path(&self) -> String {
        self.path.clone()
    }

    fn document_ready(&self) -> BoxFuture<'static, ()> {
        match &self.ready {
            Some(ready) => ready.clone().map(|_| ()).boxed(),
            None => future::ready(()).boxed(),
        }
    }
}
