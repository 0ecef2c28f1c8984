//! Condition library for `should(..)` clauses.
//!
//! Every check emits one event per observed fact, worded as a statement
//! about the element (`Unit <a.Foo> has simple name 'Foo' in (Foo.java:0)`),
//! so that negating a condition yields a readable violation without
//! rephrasing.

use super::condition::{never, Condition, ConditionEvent, ConditionEvents};
use super::element::Selectable;
use super::package_matcher::PackageMatcher;
use super::predicate::Predicate;
use crate::domain::{
    Access, AccessKind, Direction, HasAnnotations, HasModifiers, Modifier, Unit, UnitGraph,
};

fn fact<T: Selectable>(
    graph: &UnitGraph,
    element: &T,
    events: &mut ConditionEvents,
    holds: bool,
    positive: String,
    negative: String,
) {
    let message = if holds { positive } else { negative };
    events.add(
        ConditionEvent::simple(element.element_name(graph), !holds, format!("{} {message}", element.describe(graph)))
            .at(element.location(graph)),
    );
}

// ---- Names and packages ----

pub fn have_simple_name(name: &str) -> Condition<Unit> {
    let name = name.to_string();
    Condition::new(format!("have simple name '{name}'"), move |g, u: &Unit, events| {
        fact(
            g,
            u,
            events,
            u.simple_name == name,
            format!("has simple name '{name}'"),
            format!("does not have simple name '{name}'"),
        )
    })
}

pub fn not_have_simple_name(name: &str) -> Condition<Unit> {
    never(have_simple_name(name)).as_description(format!("not have simple name '{name}'"))
}

pub fn have_simple_name_ending_with(suffix: &str) -> Condition<Unit> {
    let suffix = suffix.to_string();
    Condition::new(
        format!("have simple name ending with '{suffix}'"),
        move |g, u: &Unit, events| {
            fact(
                g,
                u,
                events,
                u.simple_name.ends_with(&suffix),
                format!("has simple name ending with '{suffix}'"),
                format!("does not have simple name ending with '{suffix}'"),
            )
        },
    )
}

pub fn reside_in_a_package(identifier: &str) -> Condition<Unit> {
    let matcher = PackageMatcher::new(identifier);
    Condition::new(format!("reside in a package '{identifier}'"), move |g, u: &Unit, events| {
        let identifier = matcher.identifier();
        fact(
            g,
            u,
            events,
            matcher.matches(&u.package_name),
            format!("resides in a package '{identifier}'"),
            format!("does not reside in a package '{identifier}'"),
        )
    })
}

pub fn reside_outside_of_package(identifier: &str) -> Condition<Unit> {
    never(reside_in_a_package(identifier)).as_description(format!("reside outside of package '{identifier}'"))
}

// ---- Annotations, modifiers, hierarchy ----

pub fn be_annotated_with<T: Selectable + HasAnnotations>(type_name: &str) -> Condition<T> {
    let type_name = type_name.to_string();
    let simple = type_name.rsplit(['.', '$']).next().unwrap_or(&type_name).to_string();
    Condition::new(format!("be annotated with @{simple}"), move |g, e: &T, events| {
        fact(
            g,
            e,
            events,
            UnitGraph::is_annotated_with(e.annotations(), &type_name),
            format!("is annotated with @{simple}"),
            format!("is not annotated with @{simple}"),
        )
    })
}

pub fn not_be_annotated_with<T: Selectable + HasAnnotations>(type_name: &str) -> Condition<T> {
    let condition = be_annotated_with::<T>(type_name);
    let description = condition.description().replacen("be ", "not be ", 1);
    never(condition).as_description(description)
}

pub fn be_meta_annotated_with<T: Selectable + HasAnnotations>(type_name: &str) -> Condition<T> {
    let type_name = type_name.to_string();
    let simple = type_name.rsplit(['.', '$']).next().unwrap_or(&type_name).to_string();
    Condition::new(format!("be meta-annotated with @{simple}"), move |g, e: &T, events| {
        fact(
            g,
            e,
            events,
            g.is_meta_annotated_with(e.annotations(), &type_name),
            format!("is meta-annotated with @{simple}"),
            format!("is not meta-annotated with @{simple}"),
        )
    })
}

pub fn have_modifier<T: Selectable + HasModifiers>(modifier: Modifier) -> Condition<T> {
    Condition::new(format!("have modifier {modifier}"), move |g, e: &T, events| {
        fact(
            g,
            e,
            events,
            e.modifiers().has(modifier),
            format!("has modifier {modifier}"),
            format!("does not have modifier {modifier}"),
        )
    })
}

pub fn not_have_modifier<T: Selectable + HasModifiers>(modifier: Modifier) -> Condition<T> {
    never(have_modifier(modifier)).as_description(format!("not have modifier {modifier}"))
}

pub fn be_assignable_to(type_name: &str) -> Condition<Unit> {
    let type_name = type_name.to_string();
    Condition::new(format!("be assignable to {type_name}"), move |g, u: &Unit, events| {
        fact(
            g,
            u,
            events,
            g.is_assignable_to_name(u.id, &type_name),
            format!("is assignable to {type_name}"),
            format!("is not assignable to {type_name}"),
        )
    })
}

pub fn not_be_assignable_to(type_name: &str) -> Condition<Unit> {
    never(be_assignable_to(type_name)).as_description(format!("not be assignable to {type_name}"))
}

pub fn be_interfaces() -> Condition<Unit> {
    Condition::new("be interfaces", |g, u: &Unit, events| {
        fact(
            g,
            u,
            events,
            u.is_interface(),
            "is an interface".to_string(),
            "is not an interface".to_string(),
        )
    })
}

// ---- Dependencies and accesses ----

/// Every outgoing dependency must target a unit matching `units`.
pub fn only_depend_on_units_that(units: Predicate<Unit>) -> Condition<Unit> {
    let description = format!("only depend on units that {}", units.description());
    Condition::new(description, move |g, u: &Unit, events| {
        for dependency in g.dependencies_of(u.id, Direction::Outgoing) {
            let allowed = units.test(g, g.unit(dependency.target));
            for cause in &dependency.causes {
                events.add(ConditionEvent::simple(&u.name, !allowed, cause.message()));
            }
        }
    })
}

/// At least one outgoing dependency must target a unit matching `units`.
///
/// Each matching dependency is reported as a satisfied event, so the
/// negation lists exactly the offending dependencies.
pub fn depend_on_units_that(units: Predicate<Unit>) -> Condition<Unit> {
    let units_description = units.description().to_string();
    let description = format!("depend on units that {units_description}");
    Condition::new(description, move |g, u: &Unit, events| {
        let mut matched = false;
        for dependency in g.dependencies_where(u.id, Direction::Outgoing, |t| units.test(g, t)) {
            matched = true;
            for cause in &dependency.causes {
                events.add(ConditionEvent::satisfied(&u.name, cause.message()));
            }
        }
        if !matched {
            events.add(
                ConditionEvent::violated(
                    &u.name,
                    format!("{} does not depend on any unit that {units_description}", u.describe()),
                )
                .at(u.location()),
            );
        }
    })
}

pub fn not_depend_on_units_that(units: Predicate<Unit>) -> Condition<Unit> {
    let description = format!("not depend on units that {}", units.description());
    never(depend_on_units_that(units)).as_description(description)
}

/// Every access made from the unit's code must target a unit matching
/// `units`.
pub fn only_access_units_that(units: Predicate<Unit>) -> Condition<Unit> {
    let description = format!("only access units that {}", units.description());
    Condition::new(description, move |g, u: &Unit, events| {
        for access in g.accesses_of(u.id, Direction::Outgoing) {
            let allowed = units.test(g, g.unit(access.target.owner));
            events.add(ConditionEvent::simple(&u.name, !allowed, access.message()));
        }
    })
}

/// Every access targeting the unit must originate in a unit matching
/// `units`.
pub fn only_be_accessed_by_units_that(units: Predicate<Unit>) -> Condition<Unit> {
    let description = format!("only be accessed by units that {}", units.description());
    Condition::new(description, move |g, u: &Unit, events| {
        for access in g.accesses_of(u.id, Direction::Incoming) {
            let allowed = units.test(g, g.unit(access.origin_unit));
            events.add(ConditionEvent::simple(&u.name, !allowed, access.message()));
        }
    })
}

/// No method call made from the unit's code may match `calls`.
pub fn not_call_methods_where(calls: Predicate<Access>) -> Condition<Unit> {
    let description = format!("not call methods where {}", calls.description());
    Condition::new(description, move |g, u: &Unit, events| {
        let method_calls = g
            .accesses_of(u.id, Direction::Outgoing)
            .filter(|a| a.kind == AccessKind::CallMethod);
        for access in method_calls {
            events.add(ConditionEvent::simple(&u.name, calls.test(g, access), access.message()));
        }
    })
}
