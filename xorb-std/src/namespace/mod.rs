//! Namespaces: path-prefixes mapped to handler sequences.
//!
//! - [`NamespaceTable`] stores the registrations.
//! - [`resolve`] flattens the handlers of every prefix matching a path.

pub mod resolver;
pub mod table;

pub use resolver::{matching_prefixes, resolve};
pub use table::{CURRENT, NamespaceTable};
