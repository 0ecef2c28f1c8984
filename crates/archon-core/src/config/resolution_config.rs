//! Resolution configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for cross-unit reference resolution.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Look up missing references on the auxiliary class path. Default: false.
    pub secondary_resolution: Option<bool>,
    /// How many hops of transitively fetched units to follow. Default: 1.
    pub max_depth: Option<u32>,
    /// Replace unresolvable references with stubs. Default: true.
    pub create_stubs: Option<bool>,
    /// Timeout for a single auxiliary lookup in milliseconds. Default: 5000.
    pub lookup_timeout_ms: Option<u64>,
    /// Glob patterns over unit names that are always looked up on the
    /// auxiliary class path, even when secondary resolution is off.
    #[serde(default)]
    pub always_resolve: Vec<String>,
}

impl ResolutionConfig {
    /// Returns whether secondary resolution is on, defaulting to false.
    pub fn effective_secondary_resolution(&self) -> bool {
        self.secondary_resolution.unwrap_or(false)
    }

    /// Returns the effective resolution depth, defaulting to 1.
    pub fn effective_max_depth(&self) -> u32 {
        self.max_depth.unwrap_or(1)
    }

    /// Returns whether stubs may be created, defaulting to true.
    pub fn effective_create_stubs(&self) -> bool {
        self.create_stubs.unwrap_or(true)
    }

    /// Returns the effective lookup timeout, defaulting to 5 seconds.
    pub fn effective_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms.unwrap_or(5_000))
    }
}
