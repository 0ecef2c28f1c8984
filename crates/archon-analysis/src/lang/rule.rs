//! Rule trees and the fluent surface that builds them.

use std::fmt;
use std::marker::PhantomData;

use archon_core::errors::RuleEvaluationError;
use serde::Serialize;

use super::condition::{never, Condition, ConditionEvents};
use super::element::Selectable;
use super::predicate::Predicate;
use crate::domain::UnitGraph;
use crate::evaluation::{self, EvaluationResult};

/// Severity printed in failure reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        })
    }
}

/// What the engine got from running a rule against a graph.
#[derive(Debug, Default)]
pub struct RuleCheck {
    /// Elements the condition was applied to.
    pub checked: usize,
    pub events: ConditionEvents,
}

/// Anything the evaluation engine can run.
pub trait Rule: Send + Sync {
    fn description(&self) -> String;

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    /// Plural used in the empty-selection message.
    fn noun(&self) -> &'static str {
        "units"
    }

    /// Per-rule override of `evaluation.fail_on_empty_should`.
    fn allow_empty_should(&self) -> Option<bool> {
        None
    }

    fn check(&self, graph: &UnitGraph, parallel: bool) -> Result<RuleCheck, RuleEvaluationError>;

    /// Evaluate with default options.
    fn evaluate(&self, graph: &UnitGraph) -> Result<EvaluationResult, RuleEvaluationError>
    where
        Self: Sized,
    {
        evaluation::evaluate(self, graph)
    }
}

/// The `that(..)` half of a rule.
pub struct GivenElements<T> {
    negated: bool,
    selection: Option<Predicate<T>>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Selectable> GivenElements<T> {
    pub(crate) fn new(negated: bool) -> Self {
        Self {
            negated,
            selection: None,
            _kind: PhantomData,
        }
    }

    /// Narrow the selection; repeated calls conjoin.
    pub fn that(self, predicate: Predicate<T>) -> Self {
        self.and_that(predicate)
    }

    pub fn and_that(mut self, predicate: Predicate<T>) -> Self {
        self.selection = Some(match self.selection {
            Some(current) => current.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn or_that(mut self, predicate: Predicate<T>) -> Self {
        self.selection = Some(match self.selection {
            Some(current) => current.or(predicate),
            None => predicate,
        });
        self
    }

    pub fn should(self, condition: Condition<T>) -> ArchRule<T> {
        ArchRule {
            negated: self.negated,
            selection: self.selection,
            condition,
            because: None,
            description: None,
            allow_empty_should: None,
            priority: Priority::default(),
        }
    }
}

/// An immutable rule: selection, condition, and how it reads.
///
/// Reusable across graphs; every modifier returns a new rule.
pub struct ArchRule<T> {
    negated: bool,
    selection: Option<Predicate<T>>,
    condition: Condition<T>,
    because: Option<String>,
    description: Option<String>,
    allow_empty_should: Option<bool>,
    priority: Priority,
}

impl<T> Clone for ArchRule<T> {
    fn clone(&self) -> Self {
        Self {
            negated: self.negated,
            selection: self.selection.clone(),
            condition: self.condition.clone(),
            because: self.because.clone(),
            description: self.description.clone(),
            allow_empty_should: self.allow_empty_should,
            priority: self.priority,
        }
    }
}

impl<T> fmt::Debug for ArchRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchRule")
            .field("negated", &self.negated)
            .field("selection", &self.selection)
            .field("condition", &self.condition)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

impl<T: Selectable> ArchRule<T> {
    pub fn and_should(mut self, condition: Condition<T>) -> Self {
        self.condition = self.condition.and(condition);
        self
    }

    pub fn or_should(mut self, condition: Condition<T>) -> Self {
        self.condition = self.condition.or(condition);
        self
    }

    /// Appends `, because <reason>` to the description.
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.because = Some(reason.into());
        self
    }

    /// Replaces the generated description.
    pub fn as_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether an empty selection passes, overriding the configuration.
    pub fn allow_empty_should(mut self, allow: bool) -> Self {
        self.allow_empty_should = Some(allow);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    fn generated_description(&self) -> String {
        let mut description = String::new();
        if self.negated {
            description.push_str("no ");
        }
        description.push_str(T::NOUN);
        if let Some(ref selection) = self.selection {
            description.push_str(" that ");
            description.push_str(selection.description());
        }
        description.push_str(" should ");
        description.push_str(self.condition.description());
        description
    }
}

impl<T: Selectable> Rule for ArchRule<T> {
    fn description(&self) -> String {
        let base = match self.description {
            Some(ref description) => description.clone(),
            None => self.generated_description(),
        };
        match self.because {
            Some(ref reason) => format!("{base}, because {reason}"),
            None => base,
        }
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn noun(&self) -> &'static str {
        T::NOUN
    }

    fn allow_empty_should(&self) -> Option<bool> {
        self.allow_empty_should
    }

    fn check(&self, graph: &UnitGraph, parallel: bool) -> Result<RuleCheck, RuleEvaluationError> {
        let selected: Vec<&T> = T::select(graph)
            .into_iter()
            .filter(|e| self.selection.as_ref().map_or(true, |p| p.test(graph, e)))
            .collect();
        let condition = if self.negated {
            never(self.condition.clone())
        } else {
            self.condition.clone()
        };
        let description = Rule::description(self);
        let events = evaluation::check_elements(&description, graph, &selected, parallel, |element, events| {
            condition.check(graph, element, events)
        })?;
        Ok(RuleCheck {
            checked: selected.len(),
            events,
        })
    }
}
