//! Prefix resolution of the namespace table against a path.

use super::table::NamespaceTable;
use xorb_core::SharedHandler;

/// Collect the handlers of every prefix `path` starts with.
///
/// Matching is a literal string-prefix test. Every matching prefix
/// contributes, in table order, and within a prefix in registration order.
/// There is no longest-match rule; the empty prefix matches every path.
pub fn resolve(table: &NamespaceTable, path: &str) -> Vec<SharedHandler> {
    let mut resolved = Vec::new();
    for (prefix, handlers) in table.iter() {
        if path.starts_with(prefix) {
            tracing::trace!(target: "xorb::dispatch", prefix, path, handlers = handlers.len(), "namespace matched");
            resolved.extend(handlers.iter().cloned());
        }
    }
    resolved
}

/// Prefixes of `table` matching `path`, in table order.
pub fn matching_prefixes<'a>(table: &'a NamespaceTable, path: &str) -> Vec<&'a str> {
    table
        .iter()
        .filter(|(prefix, _)| path.starts_with(prefix))
        .map(|(prefix, _)| prefix)
        .collect()
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
    fn unions_every_matching_prefix_in_declaration_order() {
        let mut table = NamespaceTable::new();
        let root = noop();
        let a1 = noop();
        let a2 = noop();
        let b = noop();
        table.register("/", root.clone()).unwrap();
        table.register("/a", vec![a1.clone(), a2.clone()]).unwrap();
        table.register("/b", b).unwrap();

        let resolved = resolve(&table, "/a/x");

        assert_eq!(resolved.len(), 3);
        assert!(Arc::ptr_eq(&resolved[0], &root));
        assert!(Arc::ptr_eq(&resolved[1], &a1));
        assert!(Arc::ptr_eq(&resolved[2], &a2));
    }

    #[test]
    fn declaration_order_beats_prefix_length() {
        let mut table = NamespaceTable::new();
        let long = noop();
        let short = noop();
        table.register("/users/edit", long.clone()).unwrap();
        table.register("/users", short.clone()).unwrap();

        let resolved = resolve(&table, "/users/edit/7");
        assert!(Arc::ptr_eq(&resolved[0], &long));
        assert!(Arc::ptr_eq(&resolved[1], &short));
        assert_eq!(matching_prefixes(&table, "/users/1"), vec!["/users"]);
    }

    #[test]
    fn empty_prefix_matches_everything_and_literal_comparison_is_used() {
        let mut table = NamespaceTable::new();
        table.register("", noop()).unwrap();
        table.register("/ab", noop()).unwrap();

        assert_eq!(resolve(&table, "/abc").len(), 2);
        assert_eq!(resolve(&table, "/a").len(), 1);
        assert_eq!(matching_prefixes(&table, "anything"), vec![""]);
    }

    #[test]
    fn empty_table_resolves_to_nothing() {
        assert!(resolve(&NamespaceTable::new(), "/").is_empty());
    }
}
