//! Hook callback trait and adapters.

use std::sync::{Arc, OnceLock};

use modwatch_core::result::AppResult;
use modwatch_core::traits::Unit;

/// Callback invoked with a unit once that unit finishes loading.
///
/// A returned error is logged at the notification boundary and discarded;
/// it never reaches the loader and never prevents other hooks from
/// running.
pub trait LoadHook: Send + Sync + 'static {
    /// Called with the fully loaded unit.
    fn on_unit_loaded(&self, unit: &Arc<dyn Unit>) -> AppResult<()>;
}

impl<F> LoadHook for F
where
    F: Fn(&Arc<dyn Unit>) -> AppResult<()> + Send + Sync + 'static,
{
    fn on_unit_loaded(&self, unit: &Arc<dyn Unit>) -> AppResult<()> {
        self(unit)
    }
}

/// A hook whose real callback is built lazily, on first fire.
///
/// Registering a `DeferredHook` does not run the factory, so the
/// instrumentation code behind the hook is not pulled in until its target
/// unit actually loads. The factory result is memoized; a factory error
/// surfaces as an ordinary hook failure.
pub struct DeferredHook {
    factory: Box<dyn Fn() -> AppResult<Arc<dyn LoadHook>> + Send + Sync>,
    resolved: OnceLock<Arc<dyn LoadHook>>,
}

impl DeferredHook {
    /// Creates a hook that builds its callback with `factory` on first fire.
    pub fn new(factory: impl Fn() -> AppResult<Arc<dyn LoadHook>> + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            resolved: OnceLock::new(),
        }
    }

    fn resolved_hook(&self) -> AppResult<Arc<dyn LoadHook>> {
        if let Some(hook) = self.resolved.get() {
            return Ok(hook.clone());
        }
        let hook = (self.factory)()?;
        // Under concurrent first fires the earliest stored value wins.
        Ok(self.resolved.get_or_init(|| hook).clone())
    }
}

impl LoadHook for DeferredHook {
    fn on_unit_loaded(&self, unit: &Arc<dyn Unit>) -> AppResult<()> {
        self.resolved_hook()?.on_unit_loaded(unit)
    }
}
