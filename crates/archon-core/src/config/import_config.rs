//! Import configuration.

use serde::{Deserialize, Serialize};

/// Configuration for locating and parsing class files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ImportConfig {
    /// Abort the whole import on the first malformed unit. Default: false.
    pub strict: Option<bool>,
    /// Worker threads for parsing. Default: rayon's global pool.
    pub threads: Option<usize>,
    /// Glob patterns over source paths to skip (e.g. `**/test/**`).
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ImportConfig {
    /// Returns the effective strict flag, defaulting to false.
    pub fn effective_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }
}
