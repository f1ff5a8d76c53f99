//! # xorb-core
//!
//! Core contracts for the Xorb application shell.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! modules and handlers that don't need the full `xorb-std` implementation.
//!
//! # Building Blocks
//!
//! ## [`Module`]
//!
//! A named capability registered on the application. Modules expose
//! properties and methods that can be mounted as endpoints.
//!
//! ## [`Handler`]
//!
//! A unit of dispatch logic registered under a path-prefix namespace.
//! Handlers run strictly in order and advance the run by calling their
//! [`Next`] continuation.
//!
//! ## [`DispatchContext`]
//!
//! The read-only view of namespaces, modules and the current path handed to
//! every handler.
//!
//! # Error Types
//!
//! - [`XorbError`] - Top-level error type
//! - [`DispatchError`] - Raised at the end of a dispatch run
//! - [`MountError`] - Endpoint mounting failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod error;
mod handler;
mod module;
mod next;

/// Payload carried between handlers and in and out of module members.
pub type Data = serde_json::Value;

// Re-exports
pub use context::DispatchContext;
pub use error::{
    DispatchError, Failure, HandlerError, ModuleError, MountError, NamespaceError,
    RegistryError, XorbError, handler_error,
};
pub use handler::{Callbacks, Handler, HandlerFn, SharedHandler, handler_fn};
pub use module::{AsAny, MemberKind, Module};
pub use next::{Advance, Next};
