//! Described predicates with left-to-right `and`/`or` composition.

use std::fmt;
use std::ops::Not;
use std::sync::Arc;

use crate::domain::UnitGraph;

type TestFn<T> = dyn Fn(&UnitGraph, &T) -> bool + Send + Sync;

/// A test over elements of type `T` plus the text it contributes to a rule
/// description.
///
/// Composition never rewrites precedence: `a.or(b).and(c)` is
/// `(a or b) and c`, described `"a or b and c"`.
pub struct Predicate<T> {
    description: String,
    test: Arc<TestFn<T>>,
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            test: Arc::clone(&self.test),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Predicate<T> {
    pub fn new<F>(description: impl Into<String>, test: F) -> Self
    where
        F: Fn(&UnitGraph, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn test(&self, graph: &UnitGraph, element: &T) -> bool {
        (self.test)(graph, element)
    }

    pub fn and(self, other: Predicate<T>) -> Self {
        let description = format!("{} and {}", self.description, other.description);
        Self::new(description, move |g, e| self.test(g, e) && other.test(g, e))
    }

    pub fn or(self, other: Predicate<T>) -> Self {
        let description = format!("{} or {}", self.description, other.description);
        Self::new(description, move |g, e| self.test(g, e) || other.test(g, e))
    }

    /// Same test, different text.
    pub fn as_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            test: self.test,
        }
    }

    /// Lift into a predicate over another type through a projection; the
    /// description is kept.
    pub fn on<U, F>(self, project: F) -> Predicate<U>
    where
        U: 'static,
        F: for<'a> Fn(&'a UnitGraph, &'a U) -> Option<&'a T> + Send + Sync + 'static,
    {
        let description = self.description.clone();
        Predicate::new(description, move |g, u| {
            project(g, u).is_some_and(|t| self.test(g, t))
        })
    }
}

impl<T: 'static> Not for Predicate<T> {
    type Output = Predicate<T>;

    fn not(self) -> Self::Output {
        let description = format!("not {}", self.description);
        Predicate::new(description, move |g, e| !self.test(g, e))
    }
}

/// `not <inner>`.
pub fn not<T: 'static>(predicate: Predicate<T>) -> Predicate<T> {
    !predicate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnitGraph;

    fn empty_graph() -> UnitGraph {
        UnitGraph::assemble(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            vec![crate::domain::Package {
                id: archon_core::types::PackageId::new(0),
                name: String::new(),
                simple_name: String::new(),
                parent: None,
                children: Vec::new(),
                units: Vec::new(),
            }],
        )
    }

    fn even() -> Predicate<i32> {
        Predicate::new("even", |_, n: &i32| n % 2 == 0)
    }

    fn positive() -> Predicate<i32> {
        Predicate::new("positive", |_, n: &i32| *n > 0)
    }

    fn small() -> Predicate<i32> {
        Predicate::new("small", |_, n: &i32| n.abs() < 10)
    }

    #[test]
    fn conjunctions_describe_left_to_right() {
        assert_eq!(even().or(positive()).and(small()).description(), "even or positive and small");
        assert_eq!(not(even()).description(), "not even");
    }

    #[test]
    fn conjunctions_aggregate_left_to_right() {
        let graph = empty_graph();
        // (even or positive) and small: 12 is even but not small.
        let p = even().or(positive()).and(small());
        assert!(p.test(&graph, &3));
        assert!(p.test(&graph, &-4));
        assert!(!p.test(&graph, &12));
        assert!(!p.test(&graph, &-3));
        // even or (positive and small) would accept 12.
        assert!(even().or(positive().and(small())).test(&graph, &12));
    }

    #[test]
    fn negation_and_projection() {
        let graph = empty_graph();
        assert!((!even()).test(&graph, &3));
        let on_len = small().on::<(i32, &'static str), _>(|_, s| Some(&s.0));
        assert!(on_len.test(&graph, &(2, "x")));
        assert_eq!(on_len.description(), "small");
    }
}
