//! Host dynamic-loading pipeline contract.
//!
//! modwatch does not own a loading runtime. It depends on these capability
//! traits, which any host loader (an in-process plugin table, a shared
//! library loader, an embedded interpreter) can implement: an ordered chain
//! of resolvers consulted for every load request, completers that finalize
//! individual loads, and a table of already-loaded units queryable by name.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::result::AppResult;

/// A dynamically loadable piece of code identified by a unique name.
pub trait Unit: Send + Sync + fmt::Debug + 'static {
    /// The unique name this unit loads under.
    fn name(&self) -> &str;

    /// Downcast access to the concrete unit type.
    fn as_any(&self) -> &dyn Any;
}

/// Finalizes the load of one unit and returns it.
pub trait UnitCompleter: Send + Sync {
    /// Performs (or finishes) the load of `name`.
    ///
    /// Implementations record the loaded unit with
    /// [`LoadPipeline::record`] before returning, so the unit is visible
    /// to [`LoadPipeline::lookup`] by the time the caller observes it.
    fn complete(&self, name: &str, pipeline: &dyn LoadPipeline) -> AppResult<Arc<dyn Unit>>;
}

/// Outcome of asking a pipeline for a lazy completer without loading.
pub enum Discovery {
    /// The host cannot hand out completers without performing a full load.
    Unsupported,
    /// No resolver in the chain recognizes the name.
    NotFound,
    /// A completer that will load the unit when invoked.
    Found(Box<dyn UnitCompleter>),
}

impl fmt::Debug for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "Unsupported"),
            Self::NotFound => write!(f, "NotFound"),
            Self::Found(_) => write!(f, "Found(..)"),
        }
    }
}

/// A participant in a pipeline's ordered resolution chain.
pub trait UnitResolver: Send + Sync {
    /// Returns a completer if this resolver can load `name`.
    ///
    /// `Ok(None)` declines, letting the pipeline consult the next resolver
    /// in the chain. An error aborts the load and reaches the original
    /// caller unchanged.
    fn resolve(
        &self,
        name: &str,
        pipeline: &dyn LoadPipeline,
    ) -> AppResult<Option<Box<dyn UnitCompleter>>>;
}

/// Contract a host loading machinery must satisfy for modwatch to observe
/// its loads.
pub trait LoadPipeline: Send + Sync {
    /// Inserts `resolver` at the highest-priority position of the chain,
    /// so it is consulted before every previously installed resolver.
    fn install_resolver(&self, resolver: Arc<dyn UnitResolver>);

    /// Attempts to obtain a lazy completer for `name` without loading it.
    fn discover(&self, name: &str) -> AppResult<Discovery>;

    /// Performs a full synchronous load of `name` through the chain.
    ///
    /// Returns the existing unit if `name` is already loaded.
    fn load(&self, name: &str) -> AppResult<Arc<dyn Unit>>;

    /// Returns the already-loaded unit named `name`, if any.
    fn lookup(&self, name: &str) -> Option<Arc<dyn Unit>>;

    /// Records `unit` as loaded, making it visible to [`Self::lookup`].
    fn record(&self, unit: Arc<dyn Unit>);
}
