//! Rule DSL: predicates select elements, conditions judge them.
//!
//! ```ignore
//! use archon_analysis::lang::{conditions, predicates, units, Rule};
//!
//! let rule = units()
//!     .that(predicates::reside_in_a_package("..service.."))
//!     .should(conditions::only_depend_on_units_that(
//!         predicates::reside_in_any_package(&["..service..", "..domain..", "java.."]),
//!     ))
//!     .because("services sit on top of the domain");
//! let result = rule.evaluate(&graph)?;
//! ```

pub mod architecture;
pub mod condition;
pub mod conditions;
pub mod element;
pub mod package_matcher;
pub mod predicate;
pub mod predicates;
pub mod rule;

pub use architecture::{LayerConstraint, LayeredArchitecture, SlicesRule};
pub use condition::{never, Condition, ConditionEvent, ConditionEvents};
pub use element::Selectable;
pub use package_matcher::PackageMatcher;
pub use predicate::{not, Predicate};
pub use rule::{ArchRule, GivenElements, Priority, Rule, RuleCheck};

use crate::domain::{Constructor, Field, Member, Method, Unit};

pub fn units() -> GivenElements<Unit> {
    GivenElements::new(false)
}

/// Rules that no selected unit may satisfy the condition.
pub fn no_units() -> GivenElements<Unit> {
    GivenElements::new(true)
}

pub fn members() -> GivenElements<Member> {
    GivenElements::new(false)
}

pub fn no_members() -> GivenElements<Member> {
    GivenElements::new(true)
}

pub fn fields() -> GivenElements<Field> {
    GivenElements::new(false)
}

pub fn no_fields() -> GivenElements<Field> {
    GivenElements::new(true)
}

pub fn methods() -> GivenElements<Method> {
    GivenElements::new(false)
}

pub fn no_methods() -> GivenElements<Method> {
    GivenElements::new(true)
}

pub fn constructors() -> GivenElements<Constructor> {
    GivenElements::new(false)
}

pub fn no_constructors() -> GivenElements<Constructor> {
    GivenElements::new(true)
}
