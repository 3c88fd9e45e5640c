//! Hook bookkeeping — ordered callbacks per unit name, plus the installed
//! flag for the pipeline interceptor.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use crate::hook::LoadHook;

struct RegistryState {
    /// Unit name → callbacks in registration order. A name present here,
    /// even with an empty list, is a watched name.
    hooks: HashMap<String, Vec<Arc<dyn LoadHook>>>,
    /// Whether an interceptor has been inserted into the pipeline.
    installed: bool,
}

/// Registry of load hooks keyed by unit name.
///
/// Pure bookkeeping: no loading logic lives here. All operations are
/// serialized under one lock, and no callback is ever invoked while that
/// lock is held, so a hook may freely register or deregister other hooks.
pub struct HookRegistry {
    state: Mutex<RegistryState>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                hooks: HashMap::new(),
                installed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().expect("hook registry lock poisoned")
    }

    /// Appends `hook` to the list for `name`, creating the list first if
    /// the name was never seen.
    pub fn register(&self, name: &str, hook: Arc<dyn LoadHook>) {
        let mut state = self.lock();
        state.hooks.entry(name.to_string()).or_default().push(hook);
        info!(unit = %name, "Load hook registered");
    }

    /// Keeps only the hooks for `name` that `matcher` rejects.
    ///
    /// Unknown names start from an empty list, so deregistering a name
    /// with no hooks never errors.
    pub fn deregister(&self, name: &str, matcher: &dyn Fn(&Arc<dyn LoadHook>) -> bool) {
        let mut state = self.lock();
        let entries = state.hooks.entry(name.to_string()).or_default();
        let before = entries.len();
        entries.retain(|hook| !matcher(hook));
        info!(
            unit = %name,
            removed = before - entries.len(),
            "Load hooks deregistered"
        );
    }

    /// Returns a snapshot of the hooks for `name`, in registration order.
    ///
    /// Looking up an unwatched name returns an empty list and leaves the
    /// registry untouched.
    pub fn hooks_for(&self, name: &str) -> Vec<Arc<dyn LoadHook>> {
        let state = self.lock();
        state.hooks.get(name).cloned().unwrap_or_default()
    }

    /// Returns whether any registration (or deregistration) has ever
    /// mentioned `name`.
    pub fn is_watched(&self, name: &str) -> bool {
        let state = self.lock();
        state.hooks.contains_key(name)
    }

    /// Returns all watched unit names.
    pub fn watched_names(&self) -> Vec<String> {
        let state = self.lock();
        state.hooks.keys().cloned().collect()
    }

    /// Returns the number of hooks currently registered for `name`.
    pub fn hook_count(&self, name: &str) -> usize {
        let state = self.lock();
        state.hooks.get(name).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Runs `install` if no interceptor was installed yet.
    ///
    /// The check and the flag flip happen under the registry lock, so
    /// `install` runs at most once per registry lifetime. Returns whether
    /// this call performed the installation.
    pub fn install_once(&self, install: impl FnOnce()) -> bool {
        let mut state = self.lock();
        if state.installed {
            return false;
        }
        state.installed = true;
        install();
        true
    }

    /// Returns whether the interceptor has been installed.
    pub fn is_installed(&self) -> bool {
        let state = self.lock();
        state.installed
    }

    /// Clears all hook state. Intended for tests; the installed flag is
    /// kept so an already-inserted interceptor is not inserted twice.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.hooks.clear();
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
