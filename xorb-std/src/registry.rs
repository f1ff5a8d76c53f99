//! Module registry.
//!
//! Stores named module instances in registration order. A name can only be
//! claimed once; the only way to release names is [`ModuleRegistry::clear`].

use std::collections::HashMap;
use std::sync::Arc;
use xorb_core::{Module, RegistryError};

/// A registry of named module instances.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn Module>>,
    order: Vec<String>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `instance` under `name`.
    ///
    /// Fails without touching the stored instance if `name` is taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        instance: Arc<dyn Module>,
    ) -> Result<Arc<dyn Module>, RegistryError> {
        let name = name.into();
        if self.modules.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered { name });
        }
        self.order.push(name.clone());
        self.modules.insert(name, instance.clone());
        Ok(instance)
    }

    /// Look up a module by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.modules.get(name).cloned()
    }

    /// Look up a module and downcast it to its concrete type.
    pub fn get_as<T: Module>(&self, name: &str) -> Option<&T> {
        self.modules
            .get(name)
            .and_then(|module| module.downcast_ref::<T>())
    }

    /// Whether a module is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn list(&self) -> Vec<String> {
        self.order.clone()
    }

    /// `(name, module)` pairs in registration order.
    pub fn entries(&self) -> Vec<(String, Arc<dyn Module>)> {
        self.order
            .iter()
            .filter_map(|name| {
                self.modules
                    .get(name)
                    .map(|module| (name.clone(), module.clone()))
            })
            .collect()
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no module is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop every module in one step.
    pub fn clear(&mut self) {
        self.modules.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ObjectModule;
    use serde_json::json;

    #[test]
    fn keeps_registration_order() {
        let mut registry = ModuleRegistry::new();
        registry.register("b", Arc::new(ObjectModule::new())).unwrap();
        registry.register("a", Arc::new(ObjectModule::new())).unwrap();
        registry.register("c", Arc::new(ObjectModule::new())).unwrap();

        assert_eq!(registry.list(), vec!["b", "a", "c"]);
    }

    #[test]
    fn rejects_duplicate_names_and_keeps_the_first_instance() {
        let mut registry = ModuleRegistry::new();
        let first: Arc<dyn Module> = Arc::new(ObjectModule::new().with_property("v", json!(1)));
        let second: Arc<dyn Module> = Arc::new(ObjectModule::new().with_property("v", json!(2)));

        registry.register("x", first.clone()).unwrap();
        let err = registry.register("x", second).err();

        assert_eq!(err, Some(RegistryError::AlreadyRegistered { name: "x".into() }));
        assert!(Arc::ptr_eq(&registry.get("x").unwrap(), &first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn typed_lookup_and_clear() {
        let mut registry = ModuleRegistry::new();
        registry
            .register("obj", Arc::new(ObjectModule::new().with_property("v", json!(7))))
            .unwrap();

        let obj = registry.get_as::<ObjectModule>("obj").unwrap();
        assert_eq!(obj.get("v"), Some(json!(7)));

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get("obj").is_none());
        assert!(registry.list().is_empty());
    }
}
