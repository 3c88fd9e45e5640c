//! Shared-library resolver using `libloading` (feature-gated).

use std::any::Any;
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use modwatch_core::config::watch::WatchConfig;
use modwatch_core::error::AppError;
use modwatch_core::result::AppResult;
use modwatch_core::traits::{LoadPipeline, Unit, UnitCompleter, UnitResolver};

/// A unit backed by a shared library (.so / .dll / .dylib).
///
/// The library handle stays alive for the lifetime of the unit, so
/// symbols resolved from it remain valid while the unit is reachable.
pub struct LibraryUnit {
    name: String,
    path: PathBuf,
    library: libloading::Library,
}

impl LibraryUnit {
    /// Returns the path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves an exported symbol from the library.
    ///
    /// # Safety
    /// The caller must ensure `T` matches the actual type of the exported
    /// symbol.
    pub unsafe fn symbol<T>(&self, symbol: &[u8]) -> AppResult<libloading::Symbol<'_, T>> {
        unsafe { self.library.get(symbol) }.map_err(|e| {
            AppError::resolution(format!(
                "Unit '{}' has no usable symbol '{}': {}",
                self.name,
                String::from_utf8_lossy(symbol),
                e
            ))
        })
    }
}

impl fmt::Debug for LibraryUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryUnit")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

impl Unit for LibraryUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Resolves unit names to shared libraries under configured search paths.
///
/// A unit named `redis` maps to `libredis.so` (platform naming) in the
/// first search path that contains it. Install into any pipeline with
/// [`LoadPipeline::install_resolver`].
pub struct LibraryResolver {
    search_paths: Vec<PathBuf>,
}

impl LibraryResolver {
    /// Creates a resolver over the given directories.
    pub fn new(search_paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            search_paths: search_paths.into_iter().collect(),
        }
    }

    /// Creates a resolver from the `watch` configuration section.
    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.search_paths.iter().map(PathBuf::from))
    }

    /// Finds the library file for `name`, if present.
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let file_name = format!("{DLL_PREFIX}{name}{DLL_SUFFIX}");
        self.search_paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }

    /// Loads every library found under the search paths through
    /// `pipeline`, returning the names that loaded.
    ///
    /// Individual load failures are logged and skipped.
    pub fn load_available(&self, pipeline: &dyn LoadPipeline) -> Vec<String> {
        let mut loaded = Vec::new();

        for name in self.available_names() {
            match pipeline.load(&name) {
                Ok(_) => loaded.push(name),
                Err(e) => {
                    error!(unit = %name, error = %e, "Error loading available unit");
                }
            }
        }

        loaded
    }

    /// Lists the unit names with a library file under the search paths.
    pub fn available_names(&self) -> Vec<String> {
        let mut names = Vec::new();

        for dir in &self.search_paths {
            let Ok(entries) = std::fs::read_dir(dir) else {
                debug!(path = %dir.display(), "Search path not readable, skipping");
                continue;
            };

            for entry in entries.flatten() {
                if let Some(name) = unit_name_from_path(&entry.path()) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
        }

        names
    }
}

impl UnitResolver for LibraryResolver {
    fn resolve(
        &self,
        name: &str,
        _pipeline: &dyn LoadPipeline,
    ) -> AppResult<Option<Box<dyn UnitCompleter>>> {
        Ok(self.locate(name).map(|path| {
            Box::new(LibraryCompleter { path }) as Box<dyn UnitCompleter>
        }))
    }
}

/// Loads one shared library and records it with the pipeline.
struct LibraryCompleter {
    path: PathBuf,
}

impl UnitCompleter for LibraryCompleter {
    fn complete(&self, name: &str, pipeline: &dyn LoadPipeline) -> AppResult<Arc<dyn Unit>> {
        // Safety: loading a shared library runs arbitrary code from the
        // resolved file. Search paths must only contain trusted units.
        let library = unsafe { libloading::Library::new(&self.path) }.map_err(|e| {
            AppError::resolution(format!(
                "Failed to load unit library '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let unit: Arc<dyn Unit> = Arc::new(LibraryUnit {
            name: name.to_string(),
            path: self.path.clone(),
            library,
        });
        pipeline.record(unit.clone());

        info!(unit = %name, path = %self.path.display(), "Shared library loaded");

        Ok(unit)
    }
}

/// Extracts the unit name from a library file path, if it is one.
fn unit_name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let stem = file_name.strip_suffix(DLL_SUFFIX)?;
    let name = stem.strip_prefix(DLL_PREFIX)?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}
