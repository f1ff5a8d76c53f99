//! # xorb - Minimal Client-Side Application Shell
//!
//! `xorb` keeps three tables for an application and one startup sequence:
//!
//! - **Modules**: named capabilities, registered once.
//! - **Mount points**: module members exposed directly on the application.
//! - **Namespaces**: path-prefixes mapped to handler sequences. On
//!   [`App::init`] every prefix of the current path contributes its
//!   handlers, and the result runs as a continuation chain.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use xorb::prelude::*;
//!
//! let mut app = App::new(StaticEnvironment::new("/blog/42"), transport);
//! app.register_module("events", Arc::new(EventsModule::new()));
//! app.mount_module_endpoint("emit", "events", Some("emit"))?;
//!
//! app.namespace("/", handler_fn(|_ctx, _err, next, _data| next.proceed()))?;
//! app.namespace("/blog", handler_fn(|_ctx, _err, next, _data| next.send(json!(42))))?;
//!
//! let handle = app.init(AppOptionsPatch::new()).await?;
//! assert_eq!(handle.wait().await?, json!(42));
//! ```
//!
//! ## Errors in a run
//!
//! Handlers report errors through their continuation. Errors never stop a
//! run; once it reaches its end the first reported error is raised and the
//! rest stay available through [`DispatchHandle::errors`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod app;
mod environment;
mod error;
mod options;

pub use app::{App, FACADE_MEMBERS};
pub use environment::{DocumentReady, Environment, StaticEnvironment};
pub use error::AppError;
pub use options::{AppOptions, AppOptionsPatch, DEFAULT_MODULE_PATH};

pub use xorb_core::{
    // Handler
    Callbacks,
    // Payload
    Data,
    DispatchContext,
    DispatchError,
    Failure,
    Handler,
    HandlerError,
    HandlerFn,
    // Module
    MemberKind,
    Module,
    ModuleError,
    MountError,
    NamespaceError,
    // Continuation
    Next,
    RegistryError,
    SharedHandler,
    XorbError,
    handler_error,
    handler_fn,
};

pub use xorb_std::{
    dispatch::{DispatchHandle, RunPhase},
    mount::Endpoint,
};

/// HTTP convenience layer.
pub mod http {
    pub use xorb_std::http::{
        Body, HttpClient, HttpError, Method, PreparedRequest, Request, Response, Transport,
        TransportError,
    };
}

/// First-party modules.
pub mod modules {
    pub use xorb_std::modules::{
        EventsModule, ListenerId, ObjectModule, TemplateEngine, TemplateError, TemplatesModule,
    };
}

/// Testing utilities.
pub mod testing {
    pub use xorb_std::testing::{FailingHandler, MockTransport, RecordingHandler, Visit};
}

/// Prelude module - common imports for Xorb.
///
/// # Usage
///
/// ```rust,ignore
/// use xorb::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Facade
        App,
        AppError,
        AppOptions,
        AppOptionsPatch,
        // Core traits
        Data,
        DispatchContext,
        DispatchError,
        DispatchHandle,
        Environment,
        Failure,
        Handler,
        HandlerError,
        Module,
        Next,
        StaticEnvironment,
        handler_fn,
        // Modules
        modules::{EventsModule, ObjectModule, TemplatesModule},
    };
}
