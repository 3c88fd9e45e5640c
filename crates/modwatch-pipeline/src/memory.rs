//! In-process reference pipeline backed by unit factories.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use tracing::{debug, info};

use modwatch_core::error::AppError;
use modwatch_core::result::AppResult;
use modwatch_core::traits::{Discovery, LoadPipeline, Unit, UnitCompleter, UnitResolver};

/// Factory producing a unit on demand, simulating an artifact that exists
/// but has not been loaded yet.
pub type UnitFactory = Arc<dyn Fn(&str) -> AppResult<Arc<dyn Unit>> + Send + Sync>;

/// A unit held entirely in memory, carrying an arbitrary JSON payload.
#[derive(Debug)]
pub struct MemoryUnit {
    name: String,
    payload: serde_json::Value,
}

impl MemoryUnit {
    /// Creates a unit with a null payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: serde_json::Value::Null,
        }
    }

    /// Creates a unit carrying `payload`.
    pub fn with_payload(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Returns the unit's payload.
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }
}

impl Unit for MemoryUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// In-memory implementation of the host loading contract.
///
/// A unit is *available* once a factory is provided for its name and
/// *loaded* once the factory has run and the unit entered the table.
/// Additional resolvers compose in front of the factory resolver, and no
/// internal lock is held while a resolver or completer runs.
pub struct MemoryPipeline {
    resolvers: RwLock<Vec<Arc<dyn UnitResolver>>>,
    units: DashMap<String, Arc<dyn Unit>>,
    factories: Arc<RwLock<HashMap<String, UnitFactory>>>,
    lazy_discovery: bool,
}

impl MemoryPipeline {
    /// Creates a pipeline that supports lazy completer discovery.
    pub fn new() -> Self {
        Self::with_discovery(true)
    }

    /// Creates a pipeline that cannot hand out lazy completers, emulating
    /// hosts that only support triggering a full load.
    pub fn without_discovery() -> Self {
        Self::with_discovery(false)
    }

    fn with_discovery(lazy_discovery: bool) -> Self {
        let factories = Arc::new(RwLock::new(HashMap::new()));
        let base: Arc<dyn UnitResolver> = Arc::new(FactoryResolver {
            factories: factories.clone(),
        });

        Self {
            resolvers: RwLock::new(vec![base]),
            units: DashMap::new(),
            factories,
            lazy_discovery,
        }
    }

    /// Makes a unit available for loading under `name`.
    pub fn provide(&self, name: impl Into<String>, factory: UnitFactory) {
        let name = name.into();
        debug!(unit = %name, "Unit factory provided");
        self.factories
            .write()
            .expect("factory table lock poisoned")
            .insert(name, factory);
    }

    /// Shorthand: makes a [`MemoryUnit`] with `payload` available under
    /// `name`.
    pub fn provide_unit(&self, name: &str, payload: serde_json::Value) {
        let factory: UnitFactory = Arc::new(move |unit_name: &str| {
            Ok(Arc::new(MemoryUnit::with_payload(unit_name, payload.clone())) as Arc<dyn Unit>)
        });
        self.provide(name, factory);
    }

    /// Returns the number of resolvers in the chain.
    pub fn resolver_count(&self) -> usize {
        self.resolvers
            .read()
            .expect("resolver chain lock poisoned")
            .len()
    }

    /// Returns the number of loaded units.
    pub fn loaded_count(&self) -> usize {
        self.units.len()
    }

    fn chain(&self) -> Vec<Arc<dyn UnitResolver>> {
        self.resolvers
            .read()
            .expect("resolver chain lock poisoned")
            .clone()
    }
}

impl Default for MemoryPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadPipeline for MemoryPipeline {
    fn install_resolver(&self, resolver: Arc<dyn UnitResolver>) {
        self.resolvers
            .write()
            .expect("resolver chain lock poisoned")
            .insert(0, resolver);
        info!("Resolver installed at front of chain");
    }

    fn discover(&self, name: &str) -> AppResult<Discovery> {
        if !self.lazy_discovery {
            return Ok(Discovery::Unsupported);
        }

        for resolver in self.chain() {
            if let Some(completer) = resolver.resolve(name, self)? {
                return Ok(Discovery::Found(completer));
            }
        }

        Ok(Discovery::NotFound)
    }

    fn load(&self, name: &str) -> AppResult<Arc<dyn Unit>> {
        if let Some(unit) = self.lookup(name) {
            return Ok(unit);
        }

        for resolver in self.chain() {
            if let Some(completer) = resolver.resolve(name, self)? {
                let unit = completer.complete(name, self)?;
                self.record(unit.clone());
                return Ok(unit);
            }
        }

        Err(AppError::not_found(format!(
            "No resolver recognizes unit '{name}'"
        )))
    }

    fn lookup(&self, name: &str) -> Option<Arc<dyn Unit>> {
        self.units.get(name).map(|entry| entry.value().clone())
    }

    fn record(&self, unit: Arc<dyn Unit>) {
        self.units.insert(unit.name().to_string(), unit);
    }
}

/// Resolves names that have a registered factory.
struct FactoryResolver {
    factories: Arc<RwLock<HashMap<String, UnitFactory>>>,
}

impl UnitResolver for FactoryResolver {
    fn resolve(
        &self,
        name: &str,
        _pipeline: &dyn LoadPipeline,
    ) -> AppResult<Option<Box<dyn UnitCompleter>>> {
        let factory = self
            .factories
            .read()
            .expect("factory table lock poisoned")
            .get(name)
            .cloned();

        Ok(factory.map(|factory| Box::new(FactoryCompleter { factory }) as Box<dyn UnitCompleter>))
    }
}

/// Runs the factory and records the unit in the pipeline's table.
struct FactoryCompleter {
    factory: UnitFactory,
}

impl UnitCompleter for FactoryCompleter {
    fn complete(&self, name: &str, pipeline: &dyn LoadPipeline) -> AppResult<Arc<dyn Unit>> {
        let unit = (self.factory)(name)?;
        pipeline.record(unit.clone());
        debug!(unit = %name, "Unit loaded");
        Ok(unit)
    }
}
