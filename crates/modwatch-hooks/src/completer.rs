//! Completers that run load hooks around the host's own loading step.

use std::sync::Arc;

use modwatch_core::result::AppResult;
use modwatch_core::traits::{LoadPipeline, Unit, UnitCompleter};

use crate::notifier::LoadNotifier;

/// Wraps an existing completer so hooks fire after it loads the unit.
///
/// Hooks observe the unit strictly after the wrapped load finishes and
/// strictly before the pipeline's caller sees it, so they may assume the
/// unit is fully initialized. A failure in the wrapped completer
/// propagates unchanged and fires nothing.
pub struct ChainedCompleter {
    inner: Box<dyn UnitCompleter>,
    notifier: Arc<LoadNotifier>,
}

impl ChainedCompleter {
    /// Chains hook notification after `inner`.
    pub fn new(inner: Box<dyn UnitCompleter>, notifier: Arc<LoadNotifier>) -> Self {
        Self { inner, notifier }
    }
}

impl UnitCompleter for ChainedCompleter {
    fn complete(&self, name: &str, pipeline: &dyn LoadPipeline) -> AppResult<Arc<dyn Unit>> {
        let unit = self.inner.complete(name, pipeline)?;
        self.notifier.notify(&unit);
        Ok(unit)
    }
}

/// Hands back a unit that was already loaded (and notified) while its
/// load request was being resolved.
pub struct PreloadedCompleter {
    unit: Arc<dyn Unit>,
}

impl PreloadedCompleter {
    /// Creates a completer returning `unit` as-is.
    pub fn new(unit: Arc<dyn Unit>) -> Self {
        Self { unit }
    }
}

impl UnitCompleter for PreloadedCompleter {
    fn complete(&self, _name: &str, _pipeline: &dyn LoadPipeline) -> AppResult<Arc<dyn Unit>> {
        Ok(self.unit.clone())
    }
}
