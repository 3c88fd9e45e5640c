//! Hook registration, dispatch order, and deregistration.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use modwatch::traits::{LoadPipeline, Unit};
use modwatch::{AppError, DeferredHook, LoadHook, MemoryUnit};

use crate::helpers::TestHost;

#[test]
fn test_hooks_fire_once_in_registration_order() {
    let host = TestHost::new();
    host.provide("redis");

    let order = Arc::new(Mutex::new(Vec::new()));
    let first_order = order.clone();
    host.watcher.register_fn("redis", move |_: &Arc<dyn Unit>| {
        first_order.lock().unwrap().push("first");
        Ok(())
    });
    let second_order = order.clone();
    host.watcher.register_fn("redis", move |_: &Arc<dyn Unit>| {
        second_order.lock().unwrap().push("second");
        Ok(())
    });

    host.pipeline.load("redis").expect("unit should load");
    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);

    // A repeated load returns the cached unit without re-firing hooks.
    host.pipeline.load("redis").expect("unit should load");
    assert_eq!(order.lock().unwrap().len(), 2);
}

#[test]
fn test_late_registration_fires_immediately() {
    let host = TestHost::new();
    host.provide("redis");
    host.pipeline.load("redis").expect("unit should load");

    let (counter, _hook) = host.register_counter("redis");

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(host.watcher.registry().hook_count("redis"), 1);
}

#[test]
fn test_late_registered_hook_sees_loaded_unit() {
    let host = TestHost::new();
    host.pipeline
        .provide_unit("redis", serde_json::json!({"version": "5.0"}));
    host.pipeline.load("redis").expect("unit should load");

    let seen = Arc::new(Mutex::new(None));
    let seen_in_hook = seen.clone();
    host.watcher.register_fn("redis", move |unit: &Arc<dyn Unit>| {
        let payload = unit
            .as_any()
            .downcast_ref::<MemoryUnit>()
            .map(|u| u.payload().clone());
        *seen_in_hook.lock().unwrap() = payload;
        Ok(())
    });

    let payload = seen.lock().unwrap().clone().expect("hook should have fired");
    assert_eq!(payload["version"], "5.0");
}

#[test]
fn test_failing_hook_does_not_block_others() {
    let host = TestHost::new();
    host.provide("redis");

    host.watcher.register_fn("redis", |_: &Arc<dyn Unit>| {
        Err(AppError::hook("instrumentation failed"))
    });
    let (counter, _hook) = host.register_counter("redis");

    let unit = host
        .pipeline
        .load("redis")
        .expect("load should still succeed");
    assert_eq!(unit.name(), "redis");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_deregister_by_predicate() {
    let host = TestHost::new();
    host.provide("redis");

    let (count_a, _hook_a) = host.register_counter("redis");
    let (count_b, hook_b) = host.register_counter("redis");
    let (count_c, _hook_c) = host.register_counter("redis");

    host.watcher
        .deregister("redis", &|hook| Arc::ptr_eq(hook, &hook_b));

    host.pipeline.load("redis").expect("unit should load");

    assert_eq!(count_a.load(Ordering::SeqCst), 1);
    assert_eq!(count_b.load(Ordering::SeqCst), 0);
    assert_eq!(count_c.load(Ordering::SeqCst), 1);
}

#[test]
fn test_deregister_unknown_name_is_silent() {
    let host = TestHost::new();
    host.watcher.deregister("ghost", &|_| true);
    assert_eq!(host.watcher.registry().hook_count("ghost"), 0);
}

#[test]
fn test_deregistration_cannot_undo_immediate_firing() {
    let host = TestHost::new();
    host.provide("redis");
    host.pipeline.load("redis").expect("unit should load");

    let (counter, hook) = host.register_counter("redis");
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    host.watcher.deregister_hook("redis", &hook);

    assert_eq!(host.watcher.registry().hook_count("redis"), 0);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unwatched_load_has_no_registry_effects() {
    let host = TestHost::new();
    host.provide("plain");
    host.provide("redis");
    let (_counter, _hook) = host.register_counter("redis");

    let unit = host.pipeline.load("plain").expect("unit should load");

    assert_eq!(unit.name(), "plain");
    assert!(!host.watcher.registry().is_watched("plain"));
    assert_eq!(
        host.watcher.registry().watched_names(),
        vec!["redis".to_string()]
    );
}

#[test]
fn test_notify_without_hooks_is_noop() {
    let host = TestHost::new();
    let unit: Arc<dyn Unit> = Arc::new(MemoryUnit::new("plain"));

    host.watcher.notify(&unit);

    assert!(host.watcher.registry().watched_names().is_empty());
}

#[test]
fn test_deferred_hook_builds_only_when_unit_loads() {
    let host = TestHost::new();
    host.provide("redis");

    let built = Arc::new(AtomicUsize::new(0));
    let fired = Arc::new(AtomicUsize::new(0));
    let built_in_factory = built.clone();
    let fired_in_hook = fired.clone();

    let hook: Arc<dyn LoadHook> = Arc::new(DeferredHook::new(move || {
        built_in_factory.fetch_add(1, Ordering::SeqCst);
        let fired = fired_in_hook.clone();
        Ok(Arc::new(move |_: &Arc<dyn Unit>| -> modwatch::AppResult<()> {
            fired.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }) as Arc<dyn LoadHook>)
    }));
    host.watcher.register("redis", hook);

    assert_eq!(built.load(Ordering::SeqCst), 0);

    host.pipeline.load("redis").expect("unit should load");

    assert_eq!(built.load(Ordering::SeqCst), 1);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
