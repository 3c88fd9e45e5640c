//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use modwatch::traits::Unit;
use modwatch::{AppResult, LoadHook, LoadWatcher, MemoryPipeline};

/// Test host bundling a pipeline and a watcher attached to it.
pub struct TestHost {
    /// The host loading pipeline under test.
    pub pipeline: Arc<MemoryPipeline>,
    /// The watcher attached to the pipeline.
    pub watcher: Arc<LoadWatcher>,
}

impl TestHost {
    /// Host whose pipeline supports lazy completer discovery.
    pub fn new() -> Self {
        Self::build(MemoryPipeline::new())
    }

    /// Host that can only trigger full loads.
    pub fn without_discovery() -> Self {
        Self::build(MemoryPipeline::without_discovery())
    }

    fn build(pipeline: MemoryPipeline) -> Self {
        let pipeline = Arc::new(pipeline);
        let watcher = Arc::new(LoadWatcher::new(pipeline.clone()));
        Self { pipeline, watcher }
    }

    /// Makes `name` available as a memory unit with an empty payload.
    pub fn provide(&self, name: &str) {
        self.pipeline.provide_unit(name, json!({}));
    }

    /// Registers a hook for `name` that counts its invocations.
    pub fn register_counter(&self, name: &str) -> (Arc<AtomicUsize>, Arc<dyn LoadHook>) {
        let counter = Arc::new(AtomicUsize::new(0));
        let hook = self
            .watcher
            .register_fn(name, counting_hook(counter.clone()));
        (counter, hook)
    }
}

/// Hook closure that bumps `counter` each time it fires.
pub fn counting_hook(
    counter: Arc<AtomicUsize>,
) -> impl Fn(&Arc<dyn Unit>) -> AppResult<()> + Send + Sync + 'static {
    move |_unit: &Arc<dyn Unit>| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
