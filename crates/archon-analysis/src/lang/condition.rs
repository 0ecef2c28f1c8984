//! Conditions and the events they emit per checked element.

use std::fmt;
use std::sync::Arc;

use archon_core::errors::BoxError;

use super::element::Selectable;
use crate::domain::{SourceLocation, UnitGraph};

/// One observation a condition made about an element.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionEvent {
    element: String,
    outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Simple {
        violated: bool,
        message: String,
        location: Option<SourceLocation>,
    },
    /// Conjunction: violated when any branch is.
    All(Vec<ConditionEvents>),
    /// Disjunction: violated only when every branch is.
    Any(Vec<ConditionEvents>),
}

impl ConditionEvent {
    pub fn satisfied(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::simple(element, false, message)
    }

    pub fn violated(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::simple(element, true, message)
    }

    /// `violated(..)` when `violated` is true, `satisfied(..)` otherwise.
    pub fn simple(element: impl Into<String>, violated: bool, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            outcome: Outcome::Simple {
                violated,
                message: message.into(),
                location: None,
            },
        }
    }

    /// Attach a location; the message gains an ` in (File.java:N)` suffix.
    pub fn at(mut self, at: SourceLocation) -> Self {
        if let Outcome::Simple {
            ref mut message,
            ref mut location,
            ..
        } = self.outcome
        {
            message.push_str(&format!(" in {at}"));
            *location = Some(at);
        }
        self
    }

    pub(crate) fn all(element: impl Into<String>, branches: Vec<ConditionEvents>) -> Self {
        Self {
            element: element.into(),
            outcome: Outcome::All(branches),
        }
    }

    pub(crate) fn any(element: impl Into<String>, branches: Vec<ConditionEvents>) -> Self {
        Self {
            element: element.into(),
            outcome: Outcome::Any(branches),
        }
    }

    /// Name of the element the event is about.
    pub fn element(&self) -> &str {
        &self.element
    }

    /// First location recorded in this event or its branches.
    pub fn location(&self) -> Option<&SourceLocation> {
        match &self.outcome {
            Outcome::Simple { location, .. } => location.as_ref(),
            Outcome::All(branches) | Outcome::Any(branches) => branches
                .iter()
                .flat_map(|b| b.iter())
                .find_map(ConditionEvent::location),
        }
    }

    pub fn is_violation(&self) -> bool {
        match &self.outcome {
            Outcome::Simple { violated, .. } => *violated,
            Outcome::All(branches) => branches.iter().any(ConditionEvents::has_violation),
            Outcome::Any(branches) => {
                !branches.is_empty() && branches.iter().all(ConditionEvents::has_violation)
            }
        }
    }

    /// Lines this event contributes to a failure report; empty unless it
    /// is a violation. A failing disjunction yields a single line joining
    /// every branch's messages with `" and "`.
    pub fn violation_messages(&self) -> Vec<String> {
        if !self.is_violation() {
            return Vec::new();
        }
        match &self.outcome {
            Outcome::Simple { message, .. } => vec![message.clone()],
            Outcome::All(branches) => branches
                .iter()
                .flat_map(|b| b.iter())
                .flat_map(ConditionEvent::violation_messages)
                .collect(),
            Outcome::Any(branches) => {
                let parts: Vec<String> = branches
                    .iter()
                    .flat_map(|b| b.iter())
                    .flat_map(ConditionEvent::violation_messages)
                    .collect();
                vec![parts.join(" and ")]
            }
        }
    }

    /// The event a negated condition would have produced.
    pub fn invert(self) -> Self {
        let outcome = match self.outcome {
            Outcome::Simple {
                violated,
                message,
                location,
            } => Outcome::Simple {
                violated: !violated,
                message,
                location,
            },
            Outcome::All(branches) => Outcome::Any(branches.into_iter().map(ConditionEvents::invert).collect()),
            Outcome::Any(branches) => Outcome::All(branches.into_iter().map(ConditionEvents::invert).collect()),
        };
        Self {
            element: self.element,
            outcome,
        }
    }
}

/// Events collected while checking one element, or a whole rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionEvents {
    events: Vec<ConditionEvent>,
}

impl ConditionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event: ConditionEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, other: ConditionEvents) {
        self.events.extend(other.events);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConditionEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn has_violation(&self) -> bool {
        self.events.iter().any(ConditionEvent::is_violation)
    }

    pub fn violations(&self) -> impl Iterator<Item = &ConditionEvent> {
        self.events.iter().filter(|e| e.is_violation())
    }

    fn invert(self) -> Self {
        Self {
            events: self.events.into_iter().map(ConditionEvent::invert).collect(),
        }
    }
}

impl IntoIterator for ConditionEvents {
    type Item = ConditionEvent;
    type IntoIter = std::vec::IntoIter<ConditionEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

type CheckFn<T> = dyn Fn(&UnitGraph, &T, &mut ConditionEvents) -> Result<(), BoxError> + Send + Sync;

/// What selected elements must satisfy.
///
/// `and`/`or` evaluate both sides for every element and never
/// short-circuit; aggregation is left to right.
pub struct Condition<T> {
    description: String,
    check: Arc<CheckFn<T>>,
}

impl<T> Clone for Condition<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            check: Arc::clone(&self.check),
        }
    }
}

impl<T> fmt::Debug for Condition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T: Selectable> Condition<T> {
    pub fn new<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&UnitGraph, &T, &mut ConditionEvents) + Send + Sync + 'static,
    {
        Self::fallible(description, move |graph, element, events| {
            check(graph, element, events);
            Ok(())
        })
    }

    /// A condition whose check may fail; the error aborts evaluation.
    pub fn fallible<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&UnitGraph, &T, &mut ConditionEvents) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            check: Arc::new(check),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn check(&self, graph: &UnitGraph, element: &T, events: &mut ConditionEvents) -> Result<(), BoxError> {
        (self.check)(graph, element, events)
    }

    pub fn and(self, other: Condition<T>) -> Self {
        let description = format!("{} and {}", self.description, other.description);
        Self::fallible(description, move |graph, element, events| {
            let (left, right) = self.check_both(&other, graph, element)?;
            events.add(ConditionEvent::all(element.element_name(graph), vec![left, right]));
            Ok(())
        })
    }

    pub fn or(self, other: Condition<T>) -> Self {
        let description = format!("{} or {}", self.description, other.description);
        Self::fallible(description, move |graph, element, events| {
            let (left, right) = self.check_both(&other, graph, element)?;
            events.add(ConditionEvent::any(element.element_name(graph), vec![left, right]));
            Ok(())
        })
    }

    pub fn as_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            check: self.check,
        }
    }

    fn check_both(
        &self,
        other: &Condition<T>,
        graph: &UnitGraph,
        element: &T,
    ) -> Result<(ConditionEvents, ConditionEvents), BoxError> {
        let mut left = ConditionEvents::new();
        self.check(graph, element, &mut left)?;
        let mut right = ConditionEvents::new();
        other.check(graph, element, &mut right)?;
        Ok((left, right))
    }
}

/// Inverts every event of `condition`: what it reported as satisfied
/// becomes a violation and vice versa.
pub fn never<T: Selectable>(condition: Condition<T>) -> Condition<T> {
    let description = format!("never {}", condition.description);
    Condition::fallible(description, move |graph, element, events| {
        let mut inner = ConditionEvents::new();
        condition.check(graph, element, &mut inner)?;
        for event in inner {
            events.add(event.invert());
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(events: Vec<ConditionEvent>) -> ConditionEvents {
        let mut branch = ConditionEvents::new();
        for e in events {
            branch.add(e);
        }
        branch
    }

    #[test]
    fn failing_disjunction_joins_messages() {
        let event = ConditionEvent::any(
            "Foo",
            vec![
                branch(vec![ConditionEvent::violated("Foo", "a failed")]),
                branch(vec![ConditionEvent::violated("Foo", "b failed")]),
            ],
        );
        assert!(event.is_violation());
        assert_eq!(event.violation_messages(), vec!["a failed and b failed".to_string()]);
    }

    #[test]
    fn disjunction_passes_when_one_branch_passes() {
        let event = ConditionEvent::any(
            "Foo",
            vec![
                branch(vec![ConditionEvent::violated("Foo", "a failed")]),
                branch(vec![ConditionEvent::satisfied("Foo", "b held")]),
            ],
        );
        assert!(!event.is_violation());
        assert!(event.violation_messages().is_empty());
    }

    #[test]
    fn conjunction_reports_every_failing_branch() {
        let event = ConditionEvent::all(
            "Foo",
            vec![
                branch(vec![ConditionEvent::violated("Foo", "a failed")]),
                branch(vec![ConditionEvent::satisfied("Foo", "b held")]),
                branch(vec![ConditionEvent::violated("Foo", "c failed")]),
            ],
        );
        assert_eq!(event.violation_messages(), vec!["a failed".to_string(), "c failed".to_string()]);
    }

    #[test]
    fn inversion_flips_simple_events_and_swaps_conjunctions() {
        let held = ConditionEvent::satisfied("Foo", "Unit <Foo> has simple name 'Foo'");
        let inverted = held.invert();
        assert!(inverted.is_violation());
        assert_eq!(inverted.violation_messages(), vec!["Unit <Foo> has simple name 'Foo'".to_string()]);

        let both_hold = ConditionEvent::all(
            "Foo",
            vec![
                branch(vec![ConditionEvent::satisfied("Foo", "a")]),
                branch(vec![ConditionEvent::satisfied("Foo", "b")]),
            ],
        );
        assert_eq!(both_hold.invert().violation_messages(), vec!["a and b".to_string()]);
    }

    #[test]
    fn locations_extend_messages() {
        let event = ConditionEvent::violated("p.Foo", "Unit <p.Foo> is bad")
            .at(SourceLocation::new("p.Foo", None, 0));
        assert_eq!(event.violation_messages(), vec!["Unit <p.Foo> is bad in (Foo.java:0)".to_string()]);
        assert_eq!(event.location().map(|l| l.line), Some(0));
    }
}
