//! Caller-owned collection of evaluated rules for external reporters.

use super::result::EvaluationResult;

/// Results registered across evaluations until flushed.
#[derive(Debug, Default)]
pub struct EvaluatedRules {
    results: Vec<EvaluationResult>,
}

impl EvaluatedRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, result: EvaluationResult) {
        self.results.push(result);
    }

    /// Hand over everything registered so far and start empty.
    pub fn flush(&mut self) -> Vec<EvaluationResult> {
        std::mem::take(&mut self.results)
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn violated(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.results.iter().filter(|r| r.has_violation())
    }

    /// JSON array of every registered result.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.results)
    }
}
