//! Runs rules against a graph and normalizes their events into results.

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use archon_core::config::EvaluationConfig;
use archon_core::errors::{BoxError, RuleEvaluationError};
use archon_core::events::{EventDispatcher, RuleEvaluatedEvent, ViolationDetectedEvent};
use rayon::prelude::*;

use super::result::{EvaluationResult, Violation};
use crate::domain::UnitGraph;
use crate::lang::{ConditionEvents, Rule, Selectable};

/// Effective evaluation settings.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationOptions {
    /// Whether a rule that selects nothing fails.
    pub fail_on_empty_should: bool,
    /// Check selected elements on the rayon pool.
    pub parallel: bool,
}

impl EvaluationOptions {
    pub fn from_config(config: &EvaluationConfig) -> Self {
        Self {
            fail_on_empty_should: config.effective_fail_on_empty_should(),
            parallel: config.effective_parallel(),
        }
    }
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self::from_config(&EvaluationConfig::default())
    }
}

pub struct RuleEvaluator {
    options: EvaluationOptions,
    events: EventDispatcher,
}

impl RuleEvaluator {
    pub fn new(options: EvaluationOptions) -> Self {
        Self {
            options,
            events: EventDispatcher::new(),
        }
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn options(&self) -> EvaluationOptions {
        self.options
    }

    /// Evaluate one rule. Condition errors and panics abort the
    /// evaluation and name the element they happened on.
    pub fn evaluate(&self, rule: &dyn Rule, graph: &UnitGraph) -> Result<EvaluationResult, RuleEvaluationError> {
        let start = Instant::now();
        let description = rule.description();
        let check = match rule.check(graph, self.options.parallel) {
            Ok(check) => check,
            Err(e) => {
                tracing::warn!(rule = %description, element = %e.element(), error = %e, "rule evaluation failed");
                return Err(e);
            }
        };

        let mut violations = BTreeSet::new();
        for event in check.events.iter() {
            for message in event.violation_messages() {
                violations.insert(Violation {
                    element: event.element().to_string(),
                    message,
                });
            }
        }
        if check.checked == 0 {
            let allow_empty = rule
                .allow_empty_should()
                .unwrap_or(!self.options.fail_on_empty_should);
            if !allow_empty {
                violations.insert(Violation {
                    element: String::new(),
                    message: empty_should_message(&description, rule.noun()),
                });
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            rule = %description,
            checked = check.checked,
            violations = violations.len(),
            duration_ms,
            "rule evaluated"
        );
        for violation in &violations {
            self.events.emit_violation_detected(&ViolationDetectedEvent {
                rule: description.clone(),
                element: violation.element.clone(),
                message: violation.message.clone(),
            });
        }
        self.events.emit_rule_evaluated(&RuleEvaluatedEvent {
            rule: description.clone(),
            checked: check.checked,
            violations: violations.len(),
            duration_ms,
        });

        Ok(EvaluationResult::new(
            description,
            rule.priority(),
            check.checked,
            violations.into_iter().collect(),
            graph.fingerprint(),
        ))
    }
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::new(EvaluationOptions::default())
    }
}

/// Evaluate with default options.
pub fn evaluate(rule: &dyn Rule, graph: &UnitGraph) -> Result<EvaluationResult, RuleEvaluationError> {
    RuleEvaluator::default().evaluate(rule, graph)
}

fn empty_should_message(rule: &str, noun: &str) -> String {
    format!(
        "Rule '{rule}' failed to check any {noun}. This means either that no {noun} have been \
         passed to the rule at all, or that no {noun} passed to the rule matched the `that()` \
         clause. To allow rules being evaluated without checking any {noun} you can either use \
         `allow_empty_should(true)` on a single rule or set `evaluation.fail_on_empty_should = false` \
         to change the behavior globally."
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Apply `check` to every element, isolating panics. Errors are reported
/// for the first failing element in selection order, whether or not the
/// run was parallel.
pub(crate) fn check_elements<T, F>(
    rule: &str,
    graph: &UnitGraph,
    elements: &[&T],
    parallel: bool,
    check: F,
) -> Result<ConditionEvents, RuleEvaluationError>
where
    T: Selectable,
    F: Fn(&T, &mut ConditionEvents) -> Result<(), BoxError> + Sync,
{
    let run = |element: &T| -> Result<ConditionEvents, RuleEvaluationError> {
        let mut events = ConditionEvents::new();
        match panic::catch_unwind(AssertUnwindSafe(|| check(element, &mut events))) {
            Ok(Ok(())) => Ok(events),
            Ok(Err(source)) => Err(RuleEvaluationError::ConditionFailed {
                rule: rule.to_string(),
                element: element.describe(graph),
                source,
            }),
            Err(payload) => Err(RuleEvaluationError::ConditionPanicked {
                rule: rule.to_string(),
                element: element.describe(graph),
                message: panic_message(payload.as_ref()),
            }),
        }
    };

    let results: Vec<Result<ConditionEvents, RuleEvaluationError>> = if parallel {
        elements.par_iter().map(|e| run(*e)).collect()
    } else {
        elements.iter().map(|e| run(*e)).collect()
    };
    let mut all = ConditionEvents::new();
    for result in results {
        all.extend(result?);
    }
    Ok(all)
}
