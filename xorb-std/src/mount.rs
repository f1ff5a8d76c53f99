//! Endpoint mounter: a capability table of named bindings backed by modules.
//!
//! A mount point is either a forwarding binding that invokes a module (or
//! one of its methods) with the module as receiver, or a snapshot of a
//! property value taken at mount time.

use crate::registry::ModuleRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use xorb_core::{Data, MemberKind, Module, ModuleError, MountError};

/// A binding stored at a mount point.
#[derive(Clone)]
pub enum Endpoint {
    /// Forwards calls to a module.
    Forward {
        /// Name the module was registered under.
        module_name: String,
        /// The module instance.
        module: Arc<dyn Module>,
        /// The method to call; `None` invokes the module itself.
        method: Option<String>,
    },
    /// A property value copied at mount time.
    Value(Data),
}

impl Endpoint {
    /// Whether the binding can be called.
    pub fn is_callable(&self) -> bool {
        matches!(self, Endpoint::Forward { .. })
    }

    /// Call a forwarding binding with `args`.
    pub fn call(&self, args: Vec<Data>) -> Result<Data, ModuleError> {
        match self {
            Endpoint::Forward {
                module,
                method: Some(method),
                ..
            } => module.call_method(method, args),
            Endpoint::Forward {
                module,
                method: None,
                ..
            } => module.invoke(args),
            Endpoint::Value(_) => Err(ModuleError::NotCallable("value endpoint".to_string())),
        }
    }

    /// The snapshot of a value binding.
    pub fn value(&self) -> Option<&Data> {
        match self {
            Endpoint::Value(value) => Some(value),
            Endpoint::Forward { .. } => None,
        }
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Forward {
                module_name,
                method,
                ..
            } => f
                .debug_struct("Forward")
                .field("module", module_name)
                .field("method", method)
                .finish(),
            Endpoint::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Named endpoint bindings, plus the record of which names were mounted.
#[derive(Default)]
pub struct MountTable {
    bindings: HashMap<String, Endpoint>,
    mounted: Vec<String>,
    reserved: HashSet<String>,
}

impl MountTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table where `names` count as permanently in use.
    ///
    /// Used to keep mount points from shadowing the owner's own operations.
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Bind `mount_point` to `module` (or its member `property`).
    pub fn mount(
        &mut self,
        registry: &ModuleRegistry,
        mount_point: &str,
        module: &str,
        property: Option<&str>,
    ) -> Result<&Endpoint, MountError> {
        let Some(instance) = registry.get(module) else {
            return Err(MountError::ModuleNotFound {
                mount_point: mount_point.to_string(),
                module: module.to_string(),
            });
        };

        let kind = match property {
            Some(property) => match instance.member_kind(property) {
                Some(kind) => Some(kind),
                None => {
                    return Err(MountError::PropertyNotFound {
                        mount_point: mount_point.to_string(),
                        module: module.to_string(),
                        property: property.to_string(),
                    });
                }
            },
            None => None,
        };

        if self.is_in_use(mount_point) {
            return Err(MountError::MountPointInUse {
                mount_point: mount_point.to_string(),
                module: module.to_string(),
            });
        }

        let endpoint = match (property, kind) {
            (Some(property), Some(MemberKind::Property)) => {
                Endpoint::Value(instance.property(property).unwrap_or(Data::Null))
            }
            (method, _) => Endpoint::Forward {
                module_name: module.to_string(),
                module: instance,
                method: method.map(str::to_string),
            },
        };

        tracing::debug!(target: "xorb::init", mount_point, module, ?property, "endpoint mounted");
        self.mounted.push(mount_point.to_string());
        Ok(self
            .bindings
            .entry(mount_point.to_string())
            .or_insert(endpoint))
    }

    /// Whether `mount_point` is bound or reserved.
    pub fn is_in_use(&self, mount_point: &str) -> bool {
        self.bindings.contains_key(mount_point) || self.reserved.contains(mount_point)
    }

    /// The binding at `mount_point`.
    pub fn get(&self, mount_point: &str) -> Option<&Endpoint> {
        self.bindings.get(mount_point)
    }

    /// Call the forwarding binding at `mount_point`.
    pub fn call(&self, mount_point: &str, args: Vec<Data>) -> Result<Data, MountError> {
        match self.bindings.get(mount_point) {
            Some(Endpoint::Value(_)) => Err(MountError::NotCallable(mount_point.to_string())),
            Some(endpoint) => Ok(endpoint.call(args)?),
            None => Err(MountError::UnknownMountPoint(mount_point.to_string())),
        }
    }

    /// Read the value binding at `mount_point`.
    pub fn read(&self, mount_point: &str) -> Option<Data> {
        self.bindings
            .get(mount_point)
            .and_then(Endpoint::value)
            .cloned()
    }

    /// Mount points in mounting order.
    pub fn mount_points(&self) -> &[String] {
        &self.mounted
    }

    /// Unbind every recorded mount point, returning their names.
    ///
    /// Reserved names are left alone.
    pub fn unmount_all(&mut self) -> Vec<String> {
        let mounted = std::mem::take(&mut self.mounted);
        for mount_point in &mounted {
            self.bindings.remove(mount_point);
        }
        mounted
    }
}
