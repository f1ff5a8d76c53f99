//! The application facade.
//!
//! [`App`] owns the module registry, the namespace table, the mount table
//! and the current-path state, and drives the startup sequence:
//!
//! ```text
//! init(patch)
//!   -> merge options
//!   -> capture the current path
//!   -> resolve the namespace table for it
//!   -> load startup modules (concurrently)
//!   -> wait for the document-ready signal
//!   -> run the dispatch chain
//!   -> mark ready once the run completes without an error
//! ```
//!
//! Registration conflicts and missing references are logged under the
//! `xorb::init` target, returned as [`XorbError`] and leave the previous
//! state untouched.

use crate::environment::Environment;
use crate::error::AppError;
use crate::options::{AppOptions, AppOptionsPatch};
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use xorb_core::{Callbacks, Data, DispatchContext, Handler, Module, SharedHandler, XorbError};
use xorb_std::dispatch::DispatchHandle;
use xorb_std::http::{HttpClient, Transport};
use xorb_std::mount::{Endpoint, MountTable};
use xorb_std::namespace::{NamespaceTable, resolve};
use xorb_std::registry::ModuleRegistry;

/// Names of the facade's own operations. Mount points cannot shadow them.
pub const FACADE_MEMBERS: &[&str] = &[
    "call",
    "current",
    "current_path",
    "destroy",
    "endpoint",
    "http",
    "init",
    "is_ready",
    "module",
    "module_as",
    "modules",
    "mount_module_endpoint",
    "mount_points",
    "namespace",
    "namespace_all",
    "namespaces",
    "options",
    "read",
    "register_module",
    "register_module_with",
    "try_register_module",
];

/// A client-side application: modules, mount points and namespace dispatch.
///
/// # Example
///
/// ```rust,ignore
/// let mut app = App::new(StaticEnvironment::new("/"), transport);
/// app.namespace("/", handler_fn(|_ctx, _err, next, _data| next.send(json!(42))))?;
/// let handle = app.init(AppOptionsPatch::new()).await?;
/// assert_eq!(handle.wait().await?, json!(42));
/// ```
pub struct App {
    environment: Arc<dyn Environment>,
    http: HttpClient,
    options: AppOptions,
    registry: ModuleRegistry,
    namespaces: NamespaceTable,
    mounts: MountTable,
    current_path: Option<String>,
    current: Vec<SharedHandler>,
    ready: Arc<AtomicBool>,
}

impl App {
    /// Create an application hosted by `environment`, talking HTTP through
    /// `transport`.
    pub fn new(environment: impl Environment, transport: impl Transport) -> Self {
        let options = AppOptions::default();
        Self {
            environment: Arc::new(environment),
            http: HttpClient::new(Arc::new(transport), options.base_path.clone()),
            options,
            registry: ModuleRegistry::new(),
            namespaces: NamespaceTable::new(),
            mounts: MountTable::with_reserved(FACADE_MEMBERS.iter().copied()),
            current_path: None,
            current: Vec::new(),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The HTTP client, bound to the configured base path.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// The merged configuration.
    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------

    /// Register `instance` under `name`.
    ///
    /// If the name is taken, logs and returns the module registered first.
    pub fn register_module(&mut self, name: &str, instance: Arc<dyn Module>) -> Arc<dyn Module> {
        self.register_module_with(name, instance, |_| {})
    }

    /// Register `instance` under `name` and run `init` once on success.
    pub fn register_module_with<F>(
        &mut self,
        name: &str,
        instance: Arc<dyn Module>,
        init: F,
    ) -> Arc<dyn Module>
    where
        F: FnOnce(&mut App),
    {
        match self.try_register_module(name, instance.clone()) {
            Ok(stored) => {
                init(self);
                stored
            }
            Err(_) => self.registry.get(name).unwrap_or(instance),
        }
    }

    /// Register `instance` under `name`, failing if the name is taken.
    pub fn try_register_module(
        &mut self,
        name: &str,
        instance: Arc<dyn Module>,
    ) -> Result<Arc<dyn Module>, XorbError> {
        let stored = self
            .registry
            .register(name, instance)
            .inspect_err(|err| tracing::error!(target: "xorb::init", "{err}"))?;
        tracing::debug!(target: "xorb::init", module = name, "module registered");
        Ok(stored)
    }

    /// The module registered under `name`.
    pub fn module(&self, name: &str) -> Option<Arc<dyn Module>> {
        self.registry.get(name)
    }

    /// The module registered under `name`, as its concrete type.
    pub fn module_as<T: Module>(&self, name: &str) -> Option<&T> {
        self.registry.get_as::<T>(name)
    }

    /// Names of every registered module, in registration order.
    pub fn modules(&self) -> Vec<String> {
        self.registry.list()
    }

    // ------------------------------------------------------------------
    // Mount points
    // ------------------------------------------------------------------

    /// Expose `module` (or its member `property`) at `mount_point`.
    ///
    /// Failures are logged and leave the mount point unbound.
    pub fn mount_module_endpoint(
        &mut self,
        mount_point: &str,
        module: &str,
        property: Option<&str>,
    ) -> Result<&Endpoint, XorbError> {
        self.mounts
            .mount(&self.registry, mount_point, module, property)
            .inspect_err(|err| tracing::error!(target: "xorb::init", "{err}"))
            .map_err(XorbError::from_mount)
    }

    /// Call the forwarding endpoint at `mount_point`.
    ///
    /// A failing module member surfaces as [`XorbError::Module`].
    pub fn call(&self, mount_point: &str, args: Vec<Data>) -> Result<Data, XorbError> {
        self.mounts
            .call(mount_point, args)
            .map_err(XorbError::from_mount)
    }

    /// Read the value endpoint at `mount_point`.
    pub fn read(&self, mount_point: &str) -> Option<Data> {
        self.mounts.read(mount_point)
    }

    /// The endpoint bound at `mount_point`.
    pub fn endpoint(&self, mount_point: &str) -> Option<&Endpoint> {
        self.mounts.get(mount_point)
    }

    /// Bound mount points, in mounting order.
    pub fn mount_points(&self) -> &[String] {
        self.mounts.mount_points()
    }

    // ------------------------------------------------------------------
    // Namespaces
    // ------------------------------------------------------------------

    /// Append `handler` to the namespace `prefix`.
    ///
    /// Returns the number of handlers now stored under `prefix`.
    pub fn namespace<H: Handler>(
        &mut self,
        prefix: &str,
        handler: H,
    ) -> Result<usize, XorbError> {
        self.register_callbacks(prefix, Callbacks::one(handler))
    }

    /// Append every handler in `handlers` to the namespace `prefix`.
    pub fn namespace_all(
        &mut self,
        prefix: &str,
        handlers: Vec<SharedHandler>,
    ) -> Result<usize, XorbError> {
        self.register_callbacks(prefix, Callbacks::Many(handlers))
    }

    fn register_callbacks(
        &mut self,
        prefix: &str,
        callbacks: Callbacks,
    ) -> Result<usize, XorbError> {
        let added = callbacks.len();
        let total = self
            .namespaces
            .register(prefix, callbacks)
            .inspect_err(|err| tracing::error!(target: "xorb::init", "{err}"))?;
        tracing::trace!(target: "xorb::init", prefix, added, total, "namespace registered");
        Ok(total)
    }

    /// Registered namespace prefixes, in registration order.
    pub fn namespaces(&self) -> Vec<String> {
        self.namespaces.list()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// The path captured by the last [`init`](App::init).
    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    /// The handler sequence resolved for the current path.
    pub fn current(&self) -> &[SharedHandler] {
        &self.current
    }

    /// Whether the dispatch chain of the last [`init`](App::init) completed
    /// without an error.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Start the application.
    ///
    /// Startup modules that fail to load are logged and skipped. Returns the
    /// handle of the dispatch run; handlers that defer their continuation
    /// keep it running after this returns, and the application turns ready
    /// only once that run completes without an error. A run that already
    /// finished with an error returns that error.
    pub async fn init(&mut self, patch: AppOptionsPatch) -> Result<DispatchHandle, AppError> {
        self.options = std::mem::take(&mut self.options).merge(patch);
        self.http.set_base_path(self.options.base_path.clone());

        let path = self.environment.current_path();
        self.current = resolve(&self.namespaces, &path);
        self.current_path = Some(path.clone());
        tracing::debug!(
            target: "xorb::init",
            path = %path,
            handlers = self.current.len(),
            "namespace resolved"
        );

        let loaders = self.options.modules.iter().map(|name| {
            let script = self.options.module_script(name);
            let http = self.http.clone();
            async move { (name.as_str(), http.get_script(&script).await) }
        });
        for (name, result) in join_all(loaders).await {
            if let Err(err) = result {
                tracing::error!(target: "xorb::init", module = name, "{err}");
            }
        }

        self.environment.document_ready().await;

        let ctx = DispatchContext::new(path)
            .with_namespaces(self.namespaces.list())
            .with_modules(self.registry.entries());
        self.ready.store(false, Ordering::Release);
        let handle = DispatchHandle::new(ctx, self.current.clone());
        let ready = self.ready.clone();
        handle.on_complete(move |outcome| match outcome {
            Ok(_) => {
                ready.store(true, Ordering::Release);
                tracing::debug!(target: "xorb::init", "application ready");
            }
            Err(err) => tracing::error!(target: "xorb::init", "{err}"),
        });
        handle.start();

        if let Some(Err(err)) = handle.outcome() {
            return Err(err.into());
        }
        Ok(handle)
    }

    /// Tear the application down: namespaces, modules and mount points.
    ///
    /// Safe to call more than once.
    pub fn destroy(&mut self) {
        self.namespaces.clear();
        self.current.clear();
        self.registry.clear();
        let unmounted = self.mounts.unmount_all();
        tracing::debug!(target: "xorb::init", unmounted = unmounted.len(), "application destroyed");
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("options", &self.options)
            .field("modules", &self.registry.list())
            .field("namespaces", &self.namespaces.list())
            .field("mount_points", &self.mounts.mount_points())
            .field("current_path", &self.current_path)
            .field("ready", &self.is_ready())
            .finish()
    }
}
