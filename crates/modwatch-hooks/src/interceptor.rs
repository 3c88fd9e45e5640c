//! Pipeline resolver that arranges hook notification around real loads.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

use modwatch_core::result::AppResult;
use modwatch_core::traits::{Discovery, LoadPipeline, UnitCompleter, UnitResolver};

use crate::completer::{ChainedCompleter, PreloadedCompleter};
use crate::notifier::LoadNotifier;
use crate::registry::HookRegistry;

/// Sits at the front of a pipeline's resolver chain and, for watched
/// names, arranges for hooks to run once the real load completes.
///
/// Handling a watched name requires calling back into the same chain this
/// interceptor is a member of. The in-progress marker makes that second,
/// re-entrant pass a decline, so the chain's remaining resolvers do the
/// actual work and resolution terminates.
pub struct LoadInterceptor {
    registry: Arc<HookRegistry>,
    notifier: Arc<LoadNotifier>,
    /// Names this instance is currently re-entering the pipeline for.
    in_progress: Mutex<HashSet<String>>,
}

impl LoadInterceptor {
    /// Creates an interceptor over `registry`, notifying through
    /// `notifier`.
    pub fn new(registry: Arc<HookRegistry>, notifier: Arc<LoadNotifier>) -> Self {
        Self {
            registry,
            notifier,
            in_progress: Mutex::new(HashSet::new()),
        }
    }

    /// Marks `name` in progress, or returns `None` if it already is.
    fn begin(&self, name: &str) -> Option<InProgressGuard<'_>> {
        let mut in_progress = self
            .in_progress
            .lock()
            .expect("in-progress set lock poisoned");
        if !in_progress.insert(name.to_string()) {
            return None;
        }
        Some(InProgressGuard {
            interceptor: self,
            name: name.to_string(),
        })
    }
}

/// Removes the in-progress marker on every exit path, errors included.
struct InProgressGuard<'a> {
    interceptor: &'a LoadInterceptor,
    name: String,
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.interceptor
            .in_progress
            .lock()
            .expect("in-progress set lock poisoned")
            .remove(&self.name);
    }
}

impl UnitResolver for LoadInterceptor {
    fn resolve(
        &self,
        name: &str,
        pipeline: &dyn LoadPipeline,
    ) -> AppResult<Option<Box<dyn UnitCompleter>>> {
        // Unwatched names pass through untouched.
        if !self.registry.is_watched(name) {
            return Ok(None);
        }

        // A present marker means this is the re-entrant pass for `name`:
        // step aside so the real resolution machinery runs.
        let Some(_guard) = self.begin(name) else {
            return Ok(None);
        };

        match pipeline.discover(name)? {
            Discovery::Found(inner) => {
                debug!(unit = %name, "Chaining hook notification onto discovered completer");
                Ok(Some(Box::new(ChainedCompleter::new(
                    inner,
                    self.notifier.clone(),
                ))))
            }
            Discovery::NotFound => Ok(None),
            Discovery::Unsupported => {
                debug!(unit = %name, "Host lacks lazy discovery, loading directly");
                let unit = pipeline.load(name)?;
                self.notifier.notify(&unit);
                Ok(Some(Box::new(PreloadedCompleter::new(unit))))
            }
        }
    }
}
