//! # xorb-std
//!
//! Standard implementations for the Xorb application shell.
//!
//! This crate provides:
//! - **Module registry**: [`ModuleRegistry`](registry::ModuleRegistry)
//! - **Endpoint mounting**: [`MountTable`](mount::MountTable)
//! - **Namespaces**: [`NamespaceTable`](namespace::NamespaceTable) and the
//!   prefix [`resolve`](namespace::resolve)r
//! - **Dispatch**: the continuation-chain [`run`](dispatch::run)ner
//! - **HTTP**: [`HttpClient`](http::HttpClient) over an injected transport
//! - **Standard modules**: object, events, templates

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core contracts
pub use xorb_core;

// Modules
pub mod dispatch;
pub mod http;
pub mod modules;
pub mod mount;
pub mod namespace;
pub mod registry;
pub mod testing;
