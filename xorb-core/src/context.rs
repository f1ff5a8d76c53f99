//! Read-only view of the application handed to every dispatch handler.

use crate::module::Module;
use std::sync::Arc;

/// The context object passed to each handler of a dispatch run.
///
/// It is captured once before the run starts. Handlers can inspect the
/// registered namespaces and modules, but cannot mutate the application
/// through it.
#[derive(Clone, Default)]
pub struct DispatchContext {
    namespaces: Vec<String>,
    modules: Vec<(String, Arc<dyn Module>)>,
    current_path: String,
}

impl DispatchContext {
    /// Create a context for `current_path` with no namespaces or modules.
    pub fn new(current_path: impl Into<String>) -> Self {
        Self {
            current_path: current_path.into(),
            ..Self::default()
        }
    }

    /// Attach the registered namespace keys.
    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// Attach the registered modules, in registration order.
    pub fn with_modules(mut self, modules: Vec<(String, Arc<dyn Module>)>) -> Self {
        self.modules = modules;
        self
    }

    /// The path the run was resolved against.
    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Registered namespace keys, in registration order.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Look up a registered module.
    pub fn module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules
            .iter()
            .find(|(registered, _)| registered == name)
            .map(|(_, module)| module)
    }

    /// Registered module names, in registration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|(name, _)| name.as_str())
    }
}

impl std::fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("namespaces", &self.namespaces)
            .field("modules", &self.module_names().collect::<Vec<_>>())
            .field("current_path", &self.current_path)
            .finish()
    }
}
