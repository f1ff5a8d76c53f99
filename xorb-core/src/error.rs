//! Error types for Xorb.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`XorbError`] - Top-level error type for all Xorb operations
//! - [`RegistryError`] - Module registration conflicts
//! - [`MountError`] - Endpoint mounting and invocation failures
//! - [`NamespaceError`] - Namespace registration failures
//! - [`DispatchError`] - Failures surfaced at the end of a dispatch run
//! - [`ModuleError`] - Failures raised by module members

use std::sync::Arc;
use thiserror::Error;

/// An error a handler passes into its continuation.
///
/// Shared so the first accumulated error can be raised while the run keeps
/// its own copy of every error it collected.
pub type HandlerError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Wraps any error into a [`HandlerError`].
pub fn handler_error<E>(error: E) -> HandlerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    Arc::new(error)
}

/// A plain message error, handy for handlers that fail with text only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct Failure(pub String);

impl Failure {
    /// Create a message error already shaped as a [`HandlerError`].
    pub fn handler(message: impl Into<String>) -> HandlerError {
        Arc::new(Failure(message.into()))
    }
}

/// Top-level error type for all Xorb operations.
#[derive(Error, Debug)]
pub enum XorbError {
    /// A module registration conflict.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An endpoint could not be mounted or invoked.
    #[error("mount error: {0}")]
    Mount(#[from] MountError),

    /// A namespace could not be registered.
    #[error("namespace error: {0}")]
    Namespace(#[from] NamespaceError),

    /// A dispatch run finished with an error.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A module member failed.
    #[error("module error: {0}")]
    Module(#[from] ModuleError),
}

/// Errors raised by the module registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A module of that name is already loaded.
    #[error("{name} could not be loaded: a module of that name is already loaded")]
    AlreadyRegistered {
        /// The conflicting module name.
        name: String,
    },
}

/// Errors raised while mounting or using an endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    /// The referenced module is not registered.
    #[error("{module} could not be mounted at {mount_point}: there is no module registered by that name")]
    ModuleNotFound {
        /// The mount point that was requested.
        mount_point: String,
        /// The missing module.
        module: String,
    },

    /// The module has no member of that name.
    #[error("{module}.{property} could not be mounted at {mount_point}: the module has no property by that name")]
    PropertyNotFound {
        /// The mount point that was requested.
        mount_point: String,
        /// The module that was inspected.
        module: String,
        /// The missing member.
        property: String,
    },

    /// The mount point is already bound.
    #[error("{module} could not be mounted at {mount_point}: the mount point is already in use")]
    MountPointInUse {
        /// The occupied mount point.
        mount_point: String,
        /// The module that tried to claim it.
        module: String,
    },

    /// Nothing is bound at this mount point.
    #[error("no endpoint is mounted at {0}")]
    UnknownMountPoint(String),

    /// The mount point holds a value, not a function.
    #[error("the endpoint at {0} is a value and cannot be called")]
    NotCallable(String),

    /// The module behind a forwarding endpoint failed.
    #[error(transparent)]
    Module(#[from] ModuleError),
}

/// Errors raised while registering namespaces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// The key is reserved for the resolved dispatch sequence.
    #[error("the namespace key `{0}` is reserved")]
    Reserved(String),
}

/// Errors surfaced when a dispatch run ends.
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    /// The first error a handler passed into its continuation.
    #[error("handler reported an error: {0}")]
    Handler(HandlerError),

    /// Every continuation of an unfinished run was dropped.
    #[error("dispatch chain stalled before reaching its end")]
    Stalled,
}

impl DispatchError {
    /// The handler error, if this run failed through one.
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            DispatchError::Handler(error) => Some(error),
            DispatchError::Stalled => None,
        }
    }
}

impl XorbError {
    /// Lift a mount-table error, surfacing module failures as such.
    pub fn from_mount(error: MountError) -> Self {
        match error {
            MountError::Module(error) => XorbError::Module(error),
            other => XorbError::Mount(other),
        }
    }
}

/// Errors raised by module members.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// The module has no member of that name.
    #[error("the module has no member named `{0}`")]
    UnknownMember(String),

    /// The member (or module) cannot be invoked.
    #[error("`{0}` is not callable")]
    NotCallable(String),

    /// The arguments did not fit the member's signature.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The member ran and failed.
    #[error("{0}")]
    Failed(String),
}
