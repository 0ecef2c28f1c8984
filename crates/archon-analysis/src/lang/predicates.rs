//! Predicate library for `that(..)` clauses.
//!
//! Generic predicates work on any element exposing the needed capability;
//! the rest are specific to units, members or accesses.

use regex::Regex;

use super::package_matcher::PackageMatcher;
use super::predicate::Predicate;
use crate::domain::{
    Access, AccessKind, Direction, HasAnnotations, HasModifiers, HasName, HasOwner, Member,
    MemberKind, Modifier, Unit, UnitGraph, UnitKind,
};

fn simple_type_name(type_name: &str) -> &str {
    type_name.rsplit(['.', '$']).next().unwrap_or(type_name)
}

// ---- Generic ----

/// Fully-qualified name for units, plain name for members.
pub fn have_name<T: HasName + 'static>(name: &str) -> Predicate<T> {
    let name = name.to_string();
    Predicate::new(format!("have name '{name}'"), move |_, e: &T| e.name() == name)
}

pub fn have_name_matching<T: HasName + 'static>(pattern: &str) -> Result<Predicate<T>, regex::Error> {
    let regex = Regex::new(pattern)?;
    Ok(Predicate::new(
        format!("have name matching '{pattern}'"),
        move |_, e: &T| regex.is_match(e.name()),
    ))
}

pub fn have_modifier<T: HasModifiers + 'static>(modifier: Modifier) -> Predicate<T> {
    Predicate::new(format!("have modifier {modifier}"), move |_, e: &T| {
        e.modifiers().has(modifier)
    })
}

pub fn are_public<T: HasModifiers + 'static>() -> Predicate<T> {
    have_modifier(Modifier::Public).as_description("are public")
}

/// Annotated directly with `type_name`.
pub fn are_annotated_with<T: HasAnnotations + 'static>(type_name: &str) -> Predicate<T> {
    let type_name = type_name.to_string();
    Predicate::new(
        format!("are annotated with @{}", simple_type_name(&type_name)),
        move |_, e: &T| UnitGraph::is_annotated_with(e.annotations(), &type_name),
    )
}

/// Annotated with `type_name` directly or through annotations on
/// annotation types.
pub fn are_meta_annotated_with<T: HasAnnotations + 'static>(type_name: &str) -> Predicate<T> {
    let type_name = type_name.to_string();
    Predicate::new(
        format!("are meta-annotated with @{}", simple_type_name(&type_name)),
        move |g, e: &T| g.is_meta_annotated_with(e.annotations(), &type_name),
    )
}

// ---- Units ----

pub fn have_simple_name(name: &str) -> Predicate<Unit> {
    let name = name.to_string();
    Predicate::new(format!("have simple name '{name}'"), move |_, u: &Unit| {
        u.simple_name == name
    })
}

pub fn have_simple_name_starting_with(prefix: &str) -> Predicate<Unit> {
    let prefix = prefix.to_string();
    Predicate::new(
        format!("have simple name starting with '{prefix}'"),
        move |_, u: &Unit| u.simple_name.starts_with(&prefix),
    )
}

pub fn have_simple_name_ending_with(suffix: &str) -> Predicate<Unit> {
    let suffix = suffix.to_string();
    Predicate::new(
        format!("have simple name ending with '{suffix}'"),
        move |_, u: &Unit| u.simple_name.ends_with(&suffix),
    )
}

pub fn have_fully_qualified_name(name: &str) -> Predicate<Unit> {
    have_name::<Unit>(name).as_description(format!("have fully qualified name '{name}'"))
}

pub fn reside_in_a_package(identifier: &str) -> Predicate<Unit> {
    let matcher = PackageMatcher::new(identifier);
    Predicate::new(format!("reside in a package '{identifier}'"), move |_, u: &Unit| {
        matcher.matches(&u.package_name)
    })
}

pub fn reside_in_any_package(identifiers: &[&str]) -> Predicate<Unit> {
    let matchers: Vec<PackageMatcher> = identifiers.iter().map(|i| PackageMatcher::new(*i)).collect();
    let quoted: Vec<String> = identifiers.iter().map(|i| format!("'{i}'")).collect();
    Predicate::new(
        format!("reside in any package [{}]", quoted.join(", ")),
        move |_, u: &Unit| matchers.iter().any(|m| m.matches(&u.package_name)),
    )
}

pub fn reside_outside_of_package(identifier: &str) -> Predicate<Unit> {
    (!reside_in_a_package(identifier)).as_description(format!("reside outside of package '{identifier}'"))
}

/// `type_name` itself or any of its subtypes.
pub fn are_assignable_to(type_name: &str) -> Predicate<Unit> {
    let type_name = type_name.to_string();
    Predicate::new(format!("are assignable to {type_name}"), move |g, u: &Unit| {
        g.is_assignable_to_name(u.id, &type_name)
    })
}

/// `type_name` itself or any of its supertypes.
pub fn are_assignable_from(type_name: &str) -> Predicate<Unit> {
    let type_name = type_name.to_string();
    Predicate::new(format!("are assignable from {type_name}"), move |g, u: &Unit| {
        g.unit_by_name(&type_name)
            .is_some_and(|other| g.is_assignable_from(u.id, other.id))
    })
}

fn kind_is(kind: UnitKind, description: &str) -> Predicate<Unit> {
    Predicate::new(description, move |_, u: &Unit| u.kind == kind)
}

pub fn are_interfaces() -> Predicate<Unit> {
    kind_is(UnitKind::Interface, "are interfaces")
}

pub fn are_enums() -> Predicate<Unit> {
    kind_is(UnitKind::Enum, "are enums")
}

pub fn are_annotations() -> Predicate<Unit> {
    kind_is(UnitKind::Annotation, "are annotations")
}

pub fn are_nested() -> Predicate<Unit> {
    Predicate::new("are nested", |_, u: &Unit| u.is_nested())
}

pub fn are_anonymous() -> Predicate<Unit> {
    Predicate::new("are anonymous", |_, u: &Unit| u.is_anonymous())
}

/// Referenced but never imported.
pub fn are_stubs() -> Predicate<Unit> {
    Predicate::new("are stubs", |_, u: &Unit| u.is_stub())
}

/// Units with at least one outgoing dependency on a unit matching `units`.
pub fn depend_on_units_that(units: Predicate<Unit>) -> Predicate<Unit> {
    let description = format!("depend on units that {}", units.description());
    Predicate::new(description, move |g, u: &Unit| {
        g.dependencies_where(u.id, Direction::Outgoing, |t| units.test(g, t))
            .next()
            .is_some()
    })
}

/// Units whose code accesses a member of a unit matching `units`.
pub fn access_units_that(units: Predicate<Unit>) -> Predicate<Unit> {
    let description = format!("access units that {}", units.description());
    Predicate::new(description, move |g, u: &Unit| {
        g.accesses_of(u.id, Direction::Outgoing)
            .any(|a| units.test(g, g.unit(a.target.owner)))
    })
}

/// Units with a member accessed from a unit matching `units`.
pub fn are_accessed_by_units_that(units: Predicate<Unit>) -> Predicate<Unit> {
    let description = format!("are accessed by units that {}", units.description());
    Predicate::new(description, move |g, u: &Unit| {
        g.accesses_of(u.id, Direction::Incoming)
            .any(|a| units.test(g, g.unit(a.origin_unit)))
    })
}

// ---- Members ----

pub fn have_full_name(full_name: &str) -> Predicate<Member> {
    let full_name = full_name.to_string();
    Predicate::new(format!("have full name '{full_name}'"), move |_, m: &Member| {
        m.full_name() == full_name
    })
}

pub fn are_declared_in<T: HasOwner + 'static>(type_name: &str) -> Predicate<T> {
    let type_name = type_name.to_string();
    Predicate::new(format!("are declared in {type_name}"), move |g, m: &T| {
        g.unit(m.owner()).name == type_name
    })
}

/// Members whose owning unit satisfies `units`.
pub fn are_declared_in_units_that<T: HasOwner + 'static>(units: Predicate<Unit>) -> Predicate<T> {
    let description = format!("are declared in units that {}", units.description());
    Predicate::new(description, move |g, m: &T| units.test(g, g.unit(m.owner())))
}

/// Exact parameter type names, in order.
pub fn have_raw_parameter_types(types: &[&str]) -> Predicate<Member> {
    let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
    let description = format!("have raw parameter types [{}]", types.join(", "));
    Predicate::new(description, move |g, m: &Member| {
        let parameters = m.parameters();
        parameters.len() == types.len()
            && parameters.iter().zip(&types).all(|(p, t)| g.unit(*p).name == *t)
    })
}

fn member_kind_is(kind: MemberKind, description: &str) -> Predicate<Member> {
    Predicate::new(description, move |_, m: &Member| m.kind() == kind)
}

pub fn are_fields() -> Predicate<Member> {
    member_kind_is(MemberKind::Field, "are fields")
}

pub fn are_methods() -> Predicate<Member> {
    member_kind_is(MemberKind::Method, "are methods")
}

pub fn are_constructors() -> Predicate<Member> {
    member_kind_is(MemberKind::Constructor, "are constructors")
}

// ---- Accesses ----

pub fn target_has_name(name: &str) -> Predicate<Access> {
    let name = name.to_string();
    Predicate::new(format!("target has name '{name}'"), move |_, a: &Access| {
        a.target.name == name
    })
}

/// Accesses whose target owner satisfies `units`.
pub fn target_owner(units: Predicate<Unit>) -> Predicate<Access> {
    let description = format!("target is declared in units that {}", units.description());
    Predicate::new(description, move |g, a: &Access| units.test(g, g.unit(a.target.owner)))
}

pub fn are_method_calls() -> Predicate<Access> {
    Predicate::new("are method calls", |_, a: &Access| a.kind == AccessKind::CallMethod)
}
