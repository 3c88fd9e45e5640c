//! Interceptor installation, recursion guarding, and loader composition.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use modwatch::error::ErrorKind;
use modwatch::traits::{LoadPipeline, Unit, UnitCompleter, UnitResolver};
use modwatch::{AppResult, MemoryUnit};

use crate::helpers::TestHost;

#[test]
fn test_install_is_idempotent() {
    let host = TestHost::new();
    let base = host.pipeline.resolver_count();

    host.provide("redis");
    host.provide("postgres");
    let (_count_a, _hook_a) = host.register_counter("redis");
    let (_count_b, _hook_b) = host.register_counter("postgres");
    host.watcher.ensure_installed();

    assert_eq!(host.pipeline.resolver_count(), base + 1);
}

#[test]
fn test_watched_load_terminates_and_fires() {
    let host = TestHost::new();
    host.provide("redis");
    let (counter, _hook) = host.register_counter("redis");

    let unit = host.pipeline.load("redis").expect("unit should load");

    assert_eq!(unit.name(), "redis");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_degenerate_host_load_then_notify() {
    let host = TestHost::without_discovery();
    host.provide("redis");
    let (counter, _hook) = host.register_counter("redis");

    let unit = host.pipeline.load("redis").expect("unit should load");

    assert_eq!(unit.name(), "redis");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(host.pipeline.lookup("redis").is_some());
}

#[test]
fn test_missing_watched_unit_stays_not_found() {
    for host in [TestHost::new(), TestHost::without_discovery()] {
        let (counter, _hook) = host.register_counter("ghost");

        let error = host.pipeline.load("ghost").expect_err("load should fail");

        assert_eq!(error.kind, ErrorKind::NotFound);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}

/// Resolver standing in for a previously installed loading mechanism.
struct FixtureResolver {
    name: &'static str,
    completions: Arc<AtomicUsize>,
}

impl UnitResolver for FixtureResolver {
    fn resolve(
        &self,
        name: &str,
        _pipeline: &dyn LoadPipeline,
    ) -> AppResult<Option<Box<dyn UnitCompleter>>> {
        if name != self.name {
            return Ok(None);
        }
        Ok(Some(Box::new(FixtureCompleter {
            completions: self.completions.clone(),
        })))
    }
}

struct FixtureCompleter {
    completions: Arc<AtomicUsize>,
}

impl UnitCompleter for FixtureCompleter {
    fn complete(&self, name: &str, pipeline: &dyn LoadPipeline) -> AppResult<Arc<dyn Unit>> {
        self.completions.fetch_add(1, Ordering::SeqCst);
        let unit: Arc<dyn Unit> = Arc::new(MemoryUnit::new(name));
        pipeline.record(unit.clone());
        Ok(unit)
    }
}

#[test]
fn test_existing_loader_still_runs_with_hook_after() {
    let host = TestHost::new();
    let completions = Arc::new(AtomicUsize::new(0));
    host.pipeline.install_resolver(Arc::new(FixtureResolver {
        name: "custom",
        completions: completions.clone(),
    }));

    let (counter, _hook) = host.register_counter("custom");

    host.pipeline.load("custom").expect("unit should load");

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_hook_can_register_hooks_while_firing() {
    let host = TestHost::new();
    host.provide("web");
    host.provide("db");

    let nested = Arc::new(AtomicUsize::new(0));
    let watcher = host.watcher.clone();
    let nested_in_hook = nested.clone();
    host.watcher.register_fn("web", move |_: &Arc<dyn Unit>| {
        let nested = nested_in_hook.clone();
        watcher.register_fn("db", move |_: &Arc<dyn Unit>| {
            nested.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        Ok(())
    });

    host.pipeline.load("web").expect("unit should load");
    host.pipeline.load("db").expect("unit should load");

    assert_eq!(nested.load(Ordering::SeqCst), 1);
}

#[test]
fn test_hook_can_deregister_itself_while_firing() {
    let host = TestHost::new();
    host.provide("once");

    let fired = Arc::new(AtomicUsize::new(0));
    let watcher_in_hook = host.watcher.clone();
    let fired_in_hook = fired.clone();
    host.watcher.register_fn("once", move |_: &Arc<dyn Unit>| {
        fired_in_hook.fetch_add(1, Ordering::SeqCst);
        watcher_in_hook.deregister("once", &|_| true);
        Ok(())
    });

    host.pipeline.load("once").expect("unit should load");

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(host.watcher.registry().hook_count("once"), 0);
}
