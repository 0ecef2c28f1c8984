//! Evaluation results and the failure report rendered from them.

use std::fmt;

use archon_core::types::FxHashSet;
use serde::Serialize;

use crate::lang::Priority;

/// One distinct violation line, attributed to the element it is about.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Violation {
    /// Element name; empty for rule-level violations.
    pub element: String,
    pub message: String,
}

/// Outcome of evaluating one rule against one graph.
///
/// Violations are sorted by element then message and contain no
/// duplicates, so equal inputs give equal results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    rule: String,
    priority: Priority,
    checked: usize,
    violations: Vec<Violation>,
    /// Fingerprint of the graph the rule ran against.
    fingerprint: u64,
}

impl EvaluationResult {
    pub(crate) fn new(
        rule: String,
        priority: Priority,
        checked: usize,
        violations: Vec<Violation>,
        fingerprint: u64,
    ) -> Self {
        Self {
            rule,
            priority,
            checked,
            violations,
            fingerprint,
        }
    }

    pub fn rule_description(&self) -> &str {
        &self.rule
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Number of selected elements the condition ran on.
    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn has_violation(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violation messages in report order.
    pub fn details(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.message.as_str()).collect()
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn failure_report(&self) -> FailureReport {
        let mut details: Vec<String> = Vec::with_capacity(self.violations.len());
        let mut seen = FxHashSet::default();
        for violation in &self.violations {
            if seen.insert(violation.message.as_str()) {
                details.push(violation.message.clone());
            }
        }
        FailureReport {
            rule: self.rule.clone(),
            priority: self.priority,
            details,
        }
    }

    /// `Err` with the failure report when the rule was violated.
    pub fn into_result(self) -> Result<Self, FailureReport> {
        if self.has_violation() {
            Err(self.failure_report())
        } else {
            Ok(self)
        }
    }
}

/// Human-readable rendering of a violated rule.
///
/// ```text
/// Architecture Violation [Priority: MEDIUM] - Rule 'units ... should ...' was violated (2 times):
/// Unit <com.acme.Foo> ... in (Foo.java:0)
/// Unit <com.acme.Bar> ... in (Bar.java:0)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    rule: String,
    priority: Priority,
    details: Vec<String>,
}

impl FailureReport {
    pub fn rule_description(&self) -> &str {
        &self.rule
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let times = if self.details.len() == 1 { "time" } else { "times" };
        write!(
            f,
            "Architecture Violation [Priority: {}] - Rule '{}' was violated ({} {times}):",
            self.priority,
            self.rule,
            self.details.len()
        )?;
        for line in &self.details {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureReport {}
