//! Insertion-ordered namespace table.

use std::collections::HashMap;
use xorb_core::{Callbacks, NamespaceError, SharedHandler};

/// The key reserved for the resolved handler sequence of the active run.
pub const CURRENT: &str = "current";

struct Namespace {
    prefix: String,
    handlers: Vec<SharedHandler>,
}

/// Maps path-prefixes to ordered handler sequences.
///
/// Prefixes keep their first-registration order, and handlers keep their
/// registration order within a prefix. Both orders are the execution order
/// of a dispatch run.
#[derive(Default)]
pub struct NamespaceTable {
    namespaces: Vec<Namespace>,
    index: HashMap<String, usize>,
}

impl NamespaceTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one or more handlers to `prefix`, creating it if needed.
    ///
    /// Returns the number of handlers now stored under `prefix`.
    pub fn register(
        &mut self,
        prefix: impl Into<String>,
        callbacks: impl Into<Callbacks>,
    ) -> Result<usize, NamespaceError> {
        let prefix = prefix.into();
        if prefix == CURRENT {
            return Err(NamespaceError::Reserved(prefix));
        }
        let position = match self.index.get(&prefix) {
            Some(position) => *position,
            None => {
                let position = self.namespaces.len();
                self.index.insert(prefix.clone(), position);
                self.namespaces.push(Namespace {
                    prefix,
                    handlers: Vec::new(),
                });
                position
            }
        };
        let namespace = &mut self.namespaces[position];
        namespace.handlers.extend(callbacks.into().into_vec());
        Ok(namespace.handlers.len())
    }

    /// Handlers stored under exactly `prefix`.
    pub fn handlers(&self, prefix: &str) -> Option<&[SharedHandler]> {
        self.index
            .get(prefix)
            .map(|position| self.namespaces[*position].handlers.as_slice())
    }

    /// `(prefix, handlers)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SharedHandler])> {
        self.namespaces
            .iter()
            .map(|ns| (ns.prefix.as_str(), ns.handlers.as_slice()))
    }

    /// Registered prefixes in registration order.
    pub fn list(&self) -> Vec<String> {
        self.namespaces.iter().map(|ns| ns.prefix.clone()).collect()
    }

    /// Number of registered prefixes.
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    /// Whether no prefix is registered.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Reset to the empty initial state.
    pub fn clear(&mut self) {
        self.namespaces.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use xorb_core::handler_fn;

    fn noop() -> SharedHandler {
        Arc::new(handler_fn(|_, _, next, _| next.proceed()))
    }

    #[test]
    fn mixing_single_and_list_registrations_keeps_every_handler_in_order() {
        let mut table = NamespaceTable::new();
        let handlers: Vec<SharedHandler> = (0..6).map(|_| noop()).collect();

        table.register("/a", handlers[0].clone()).unwrap();
        table.register("/a", handlers[1].clone()).unwrap();
        table
            .register("/a", vec![handlers[2].clone(), handlers[3].clone()])
            .unwrap();
        table.register("/a", handlers[4].clone()).unwrap();
        let len = table.register("/a", vec![handlers[5].clone()]).unwrap();

        assert_eq!(len, 6);
        let stored = table.handlers("/a").unwrap();
        for (stored, registered) in stored.iter().zip(&handlers) {
            assert!(Arc::ptr_eq(stored, registered));
        }
    }

    #[test]
    fn a_new_prefix_starts_as_an_empty_sequence() {
        let mut table = NamespaceTable::new();
        assert_eq!(table.register("/empty", Vec::<SharedHandler>::new()), Ok(0));
        assert_eq!(table.handlers("/empty").map(<[_]>::len), Some(0));
        assert_eq!(table.list(), vec!["/empty"]);
    }

    #[test]
    fn prefixes_keep_first_registration_order() {
        let mut table = NamespaceTable::new();
        table.register("/b", noop()).unwrap();
        table.register("/", noop()).unwrap();
        table.register("/b", noop()).unwrap();
        table.register("/a", noop()).unwrap();

        assert_eq!(table.list(), vec!["/b", "/", "/a"]);
    }

    #[test]
    fn the_current_key_is_reserved() {
        let mut table = NamespaceTable::new();
        assert_eq!(
            table.register(CURRENT, noop()),
            Err(NamespaceError::Reserved("current".into()))
        );
        assert!(table.is_empty());
    }
}
