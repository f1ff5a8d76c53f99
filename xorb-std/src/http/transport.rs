//! The network boundary of the HTTP layer.
//!
//! The shell never talks to the network itself. An embedding program
//! supplies a [`Transport`] (a `fetch` binding in a browser, an HTTP client
//! elsewhere, a mock in tests).

use super::{error::TransportError, request::PreparedRequest, response::Response};
use futures::future::BoxFuture;

/// Delivers requests and loads external scripts.
pub trait Transport: Send + Sync + 'static {
    /// Send a prepared request and eventually yield its response.
    fn send(&self, request: PreparedRequest) -> BoxFuture<'static, Result<Response, TransportError>>;

    /// Load and execute an external script.
    fn load_script(&self, url: &str) -> BoxFuture<'static, Result<(), TransportError>>;
}
