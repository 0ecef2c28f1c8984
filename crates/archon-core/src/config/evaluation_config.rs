//! Evaluation configuration.

use serde::{Deserialize, Serialize};

/// Configuration for rule evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Treat a rule that selects nothing as violated. Default: false.
    pub fail_on_empty_should: Option<bool>,
    /// Evaluate selected elements in parallel. Default: true.
    pub parallel: Option<bool>,
}

impl EvaluationConfig {
    /// Returns the effective fail-on-empty flag, defaulting to false.
    pub fn effective_fail_on_empty_should(&self) -> bool {
        self.fail_on_empty_should.unwrap_or(false)
    }

    /// Returns the effective parallel flag, defaulting to true.
    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }
}
