//! HTTP convenience layer.
//!
//! A thin request builder over an injected [`Transport`]:
//!
//! - [`Method`] is the closed set of verbs; unknown verbs are a typed error.
//! - [`HttpClient`] resolves URLs against a base path, encodes bodies and
//!   query strings, logs failed responses, and loads external scripts.

pub mod client;
pub mod error;
pub mod method;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{HttpClient, is_absolute, join_base};
pub use error::{HttpError, TransportError};
pub use method::Method;
pub use request::{Body, PreparedRequest, Request};
pub use response::Response;
pub use transport::Transport;
