//! Invokes registered hooks when a unit finishes loading.

use std::sync::Arc;

use tracing::{debug, warn};

use modwatch_core::traits::Unit;

use crate::registry::HookRegistry;

/// Fires the hooks registered for a freshly loaded unit.
pub struct LoadNotifier {
    registry: Arc<HookRegistry>,
}

impl LoadNotifier {
    /// Creates a notifier reading from `registry`.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Invokes every hook registered for `unit`'s name, in registration
    /// order.
    ///
    /// A failing hook is logged with the unit name and skipped; failures
    /// never reach the loader and never prevent later hooks from running.
    /// Units nobody watches are a no-op and leave no trace in the
    /// registry.
    pub fn notify(&self, unit: &Arc<dyn Unit>) {
        let hooks = self.registry.hooks_for(unit.name());
        if hooks.is_empty() {
            return;
        }

        debug!(unit = %unit.name(), hooks = hooks.len(), "Notifying load hooks");

        for hook in hooks {
            if let Err(error) = hook.on_unit_loaded(unit) {
                warn!(unit = %unit.name(), error = %error, "Load hook failed");
            }
        }
    }
}
