//! Unit watching configuration.

use serde::{Deserialize, Serialize};

/// Unit watching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Directories searched for loadable unit libraries.
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<String>,
    /// Whether hosts should load every available unit at startup instead
    /// of on demand.
    #[serde(default = "default_true")]
    pub auto_load: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            search_paths: default_search_paths(),
            auto_load: default_true(),
        }
    }
}

fn default_search_paths() -> Vec<String> {
    vec!["./units".to_string()]
}

fn default_true() -> bool {
    true
}
