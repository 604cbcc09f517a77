//! Permission cache configuration.

use serde::{Deserialize, Serialize};

/// Per-subject permission memo configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When `false`, every query resolves against the graph.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

fn default_enabled() -> bool {
    true
}
