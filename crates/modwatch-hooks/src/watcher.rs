//! Watcher facade — registration, deregistration, and notification of
//! load hooks against one host pipeline.

use std::sync::Arc;

use tracing::{info, warn};

use modwatch_core::result::AppResult;
use modwatch_core::traits::{LoadPipeline, Unit};

use crate::hook::LoadHook;
use crate::interceptor::LoadInterceptor;
use crate::notifier::LoadNotifier;
use crate::registry::HookRegistry;

/// Watches a host pipeline and fires hooks as named units finish loading.
///
/// Hooks registered before a unit loads fire when it loads; hooks
/// registered after fire immediately, with a warning. Each watcher is an
/// isolated instance with its own registry and interceptor, so
/// independently initialized subsystems never interfere.
pub struct LoadWatcher {
    registry: Arc<HookRegistry>,
    notifier: Arc<LoadNotifier>,
    interceptor: Arc<LoadInterceptor>,
    pipeline: Arc<dyn LoadPipeline>,
}

impl LoadWatcher {
    /// Creates a watcher over `pipeline`.
    ///
    /// Nothing is inserted into the pipeline until the first
    /// registration.
    pub fn new(pipeline: Arc<dyn LoadPipeline>) -> Self {
        let registry = Arc::new(HookRegistry::new());
        let notifier = Arc::new(LoadNotifier::new(registry.clone()));
        let interceptor = Arc::new(LoadInterceptor::new(registry.clone(), notifier.clone()));

        Self {
            registry,
            notifier,
            interceptor,
            pipeline,
        }
    }

    /// Registers `hook` to run when the unit named `name` finishes
    /// loading.
    ///
    /// The first registration inserts this watcher's interceptor at the
    /// front of the pipeline's resolver chain. If the unit is already
    /// loaded, the hook also fires immediately and a warning is emitted;
    /// a later deregistration removes the hook but cannot undo that
    /// firing.
    pub fn register(&self, name: &str, hook: Arc<dyn LoadHook>) {
        self.ensure_installed();
        self.registry.register(name, hook.clone());

        if let Some(unit) = self.pipeline.lookup(name) {
            warn!(unit = %name, "Unit already loaded, firing hook immediately");
            if let Err(error) = hook.on_unit_loaded(&unit) {
                warn!(unit = %name, error = %error, "Load hook failed");
            }
        }
    }

    /// Registers a plain closure and returns its handle, usable later
    /// with [`Self::deregister_hook`].
    pub fn register_fn<F>(&self, name: &str, hook: F) -> Arc<dyn LoadHook>
    where
        F: Fn(&Arc<dyn Unit>) -> AppResult<()> + Send + Sync + 'static,
    {
        let hook: Arc<dyn LoadHook> = Arc::new(hook);
        self.register(name, hook.clone());
        hook
    }

    /// Removes every hook for `name` that `matcher` selects.
    ///
    /// Deregistering a name with no hooks is a silent no-op.
    pub fn deregister(&self, name: &str, matcher: &dyn Fn(&Arc<dyn LoadHook>) -> bool) {
        self.registry.deregister(name, matcher);
    }

    /// Removes one specific hook previously passed to [`Self::register`]
    /// or returned by [`Self::register_fn`].
    pub fn deregister_hook(&self, name: &str, hook: &Arc<dyn LoadHook>) {
        self.registry
            .deregister(name, &|candidate| Arc::ptr_eq(candidate, hook));
    }

    /// Fires the hooks registered for `unit`'s name.
    ///
    /// Hosts whose loading machinery bypasses the resolver chain can call
    /// this directly after a load completes.
    pub fn notify(&self, unit: &Arc<dyn Unit>) {
        self.notifier.notify(unit);
    }

    /// Inserts this watcher's interceptor into the pipeline if that has
    /// not happened yet. Idempotent, safe to call on every registration.
    pub fn ensure_installed(&self) {
        let interceptor = self.interceptor.clone();
        let pipeline = self.pipeline.clone();
        let installed = self
            .registry
            .install_once(move || pipeline.install_resolver(interceptor));

        if installed {
            info!("Load interceptor installed into pipeline");
        }
    }

    /// Returns the underlying hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Returns the watched host pipeline.
    pub fn pipeline(&self) -> &Arc<dyn LoadPipeline> {
        &self.pipeline
    }

    /// Clears all hook state. Intended for tests; the interceptor stays
    /// installed and declines every name until hooks are registered
    /// again.
    pub fn reset(&self) {
        self.registry.reset();
    }
}
