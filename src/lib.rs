//! # modwatch
//!
//! Load-interception hook dispatch for dynamically loaded units.
//!
//! modwatch lets instrumentation code attach behavior to a library,
//! plugin, or module at the moment it becomes available, without forcing
//! it to load eagerly and without missing units that load before the
//! hook is registered. This facade crate re-exports the public surface of
//! the workspace.
//!
//! ```
//! use std::sync::Arc;
//!
//! use modwatch::{LoadWatcher, MemoryPipeline};
//! use modwatch::traits::{LoadPipeline, Unit};
//!
//! let pipeline = Arc::new(MemoryPipeline::new());
//! pipeline.provide_unit("redis", serde_json::json!({"version": "5.0"}));
//!
//! let watcher = LoadWatcher::new(pipeline.clone());
//! watcher.register_fn("redis", |unit| {
//!     println!("instrumenting {}", unit.name());
//!     Ok(())
//! });
//!
//! // The hook fires here, exactly once, after the real load finishes.
//! pipeline.load("redis").unwrap();
//! ```

pub use modwatch_core::config;
pub use modwatch_core::error;
pub use modwatch_core::traits;
pub use modwatch_core::{AppError, AppResult};

pub use modwatch_hooks::{
    ChainedCompleter, DeferredHook, HookRegistry, LoadHook, LoadInterceptor, LoadNotifier,
    LoadWatcher, PreloadedCompleter,
};

pub use modwatch_pipeline::{MemoryPipeline, MemoryUnit, UnitFactory};

#[cfg(feature = "dynamic")]
pub use modwatch_pipeline::{LibraryResolver, LibraryUnit};
