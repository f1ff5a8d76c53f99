//! Object-literal style module.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use xorb_core::{Data, MemberKind, Module, ModuleError};

type Method = Arc<dyn Fn(&ObjectModule, Vec<Data>) -> Result<Data, ModuleError> + Send + Sync>;

/// A module assembled from named properties and methods.
///
/// Properties are JSON values that can be changed after registration;
/// methods are closures that receive the module as their receiver.
///
/// ```rust,ignore
/// let module = ObjectModule::new()
///     .with_property("moduleProperty", json!(10))
///     .with_method("moduleMethod", |_this, args| {
///         let x = args.first().and_then(Data::as_i64).unwrap_or(0);
///         Ok(json!(x + 1))
///     });
/// ```
#[derive(Default)]
pub struct ObjectModule {
    properties: Mutex<BTreeMap<String, Data>>,
    methods: BTreeMap<String, Method>,
    invoke: Option<Method>,
}

impl ObjectModule {
    /// Create a module with no members.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property.
    pub fn with_property(self, name: impl Into<String>, value: Data) -> Self {
        self.set(name, value);
        self
    }

    /// Add a method.
    pub fn with_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&ObjectModule, Vec<Data>) -> Result<Data, ModuleError> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Make the module itself callable.
    pub fn with_invoke<F>(mut self, invoke: F) -> Self
    where
        F: Fn(&ObjectModule, Vec<Data>) -> Result<Data, ModuleError> + Send + Sync + 'static,
    {
        self.invoke = Some(Arc::new(invoke));
        self
    }

    /// Read a property.
    pub fn get(&self, name: &str) -> Option<Data> {
        self.properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Create or overwrite a property.
    pub fn set(&self, name: impl Into<String>, value: Data) {
        self.properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value);
    }
}

impl Module for ObjectModule {
    fn member_kind(&self, name: &str) -> Option<MemberKind> {
        if self.methods.contains_key(name) {
            return Some(MemberKind::Method);
        }
        self.properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
            .then_some(MemberKind::Property)
    }

    fn members(&self) -> Vec<String> {
        let mut members: Vec<String> = self
            .properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        members.extend(self.methods.keys().cloned());
        members
    }

    fn property(&self, name: &str) -> Option<Data> {
        self.get(name)
    }

    fn call_method(&self, name: &str, args: Vec<Data>) -> Result<Data, ModuleError> {
        match self.methods.get(name) {
            Some(method) => method(self, args),
            None if self.get(name).is_some() => Err(ModuleError::NotCallable(name.to_string())),
            None => Err(ModuleError::UnknownMember(name.to_string())),
        }
    }

    fn invoke(&self, args: Vec<Data>) -> Result<Data, ModuleError> {
        match &self.invoke {
            Some(invoke) => invoke(self, args),
            None => Err(ModuleError::NotCallable("module".to_string())),
        }
    }
}
