//! # Module Contract
//!
//! A module is a named capability registered on the application: an event
//! bus, a template renderer, a DOM helper. The shell knows nothing about a
//! module's internals; it only sees the members the module chooses to
//! expose through this trait.
//!
//! Members come in two kinds:
//!
//! - **Properties** are plain values, read with [`Module::property`].
//! - **Methods** are callable, invoked with [`Module::call_method`] and the
//!   module itself as receiver.
//!
//! A module may additionally be callable as a whole through
//! [`Module::invoke`].

use crate::{Data, error::ModuleError};
use std::any::Any;

/// The kind of a named module member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A plain value.
    Property,
    /// A callable member.
    Method,
}

impl MemberKind {
    /// Whether the member can be invoked.
    pub fn is_callable(self) -> bool {
        matches!(self, MemberKind::Method)
    }
}

/// Upcast helper so registered modules can be downcast to their concrete type.
pub trait AsAny: Any {
    /// Borrow `self` as [`Any`].
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A module instance exposing zero or more named members.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Xorb module",
    label = "missing `Module` implementation",
    note = "Modules must implement `member_kind` to describe their members."
)]
pub trait Module: AsAny + Send + Sync + 'static {
    /// Describe the member `name`, or `None` if the module has no such member.
    fn member_kind(&self, name: &str) -> Option<MemberKind>;

    /// Names of every member, in a stable order.
    fn members(&self) -> Vec<String> {
        Vec::new()
    }

    /// Read the current value of a property.
    fn property(&self, name: &str) -> Option<Data> {
        let _ = name;
        None
    }

    /// Call a method with the module as receiver.
    fn call_method(&self, name: &str, args: Vec<Data>) -> Result<Data, ModuleError> {
        let _ = args;
        match self.member_kind(name) {
            Some(MemberKind::Property) => Err(ModuleError::NotCallable(name.to_string())),
            _ => Err(ModuleError::UnknownMember(name.to_string())),
        }
    }

    /// Call the module itself as a function.
    fn invoke(&self, args: Vec<Data>) -> Result<Data, ModuleError> {
        let _ = args;
        Err(ModuleError::NotCallable("module".to_string()))
    }

    /// Whether the module has a member called `name`.
    fn has_member(&self, name: &str) -> bool {
        self.member_kind(name).is_some()
    }
}

impl dyn Module {
    /// Downcast to the concrete module type.
    pub fn downcast_ref<T: Module>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Counter;

    impl Module for Counter {
        fn member_kind(&self, name: &str) -> Option<MemberKind> {
            match name {
                "start" => Some(MemberKind::Property),
                "next" => Some(MemberKind::Method),
                _ => None,
            }
        }

        fn property(&self, name: &str) -> Option<Data> {
            (name == "start").then(|| json!(1))
        }

        fn call_method(&self, name: &str, args: Vec<Data>) -> Result<Data, ModuleError> {
            match name {
                "next" => {
                    let n = args.first().and_then(Data::as_i64).unwrap_or(0);
                    Ok(json!(n + 1))
                }
                other => Err(ModuleError::UnknownMember(other.to_string())),
            }
        }
    }

    #[test]
    fn default_invoke_is_not_callable() {
        let counter = Counter;
        assert_eq!(
            counter.invoke(vec![]),
            Err(ModuleError::NotCallable("module".into()))
        );
        assert!(counter.has_member("next"));
        assert!(!counter.has_member("missing"));
    }

    #[test]
    fn downcast_recovers_the_concrete_type() {
        let module: Box<dyn Module> = Box::new(Counter);
        assert!(module.downcast_ref::<Counter>().is_some());
        assert_eq!(module.call_method("next", vec![json!(4)]), Ok(json!(5)));
    }
}
