//! Element kinds a rule can select from a graph.

use archon_core::types::UnitId;

use crate::domain::member::describe;
use crate::domain::{
    Constructor, Field, Member, MemberKind, Method, SourceLocation, Unit, UnitGraph,
};

/// An element kind rules are written over.
///
/// Units select every imported unit; stubs, arrays and primitives are
/// graph nodes but are never selected.
pub trait Selectable: Send + Sync + 'static {
    /// Plural used in rule descriptions: `units`, `methods`, ...
    const NOUN: &'static str;

    /// Every element of this kind in the graph, in handle order.
    fn select(graph: &UnitGraph) -> Vec<&Self>;

    /// Stable name used to group and sort violations.
    fn element_name(&self, graph: &UnitGraph) -> String;

    /// `Unit <com.acme.Foo>`, `Method <com.acme.Foo.run()>`.
    fn describe(&self, graph: &UnitGraph) -> String;

    fn location(&self, graph: &UnitGraph) -> SourceLocation;
}

impl Selectable for Unit {
    const NOUN: &'static str = "units";

    fn select(graph: &UnitGraph) -> Vec<&Self> {
        graph
            .units()
            .iter()
            .filter(|u| !u.is_stub() && !u.is_array() && !u.is_primitive())
            .collect()
    }

    fn element_name(&self, _graph: &UnitGraph) -> String {
        self.name.clone()
    }

    fn describe(&self, _graph: &UnitGraph) -> String {
        Unit::describe(self)
    }

    fn location(&self, _graph: &UnitGraph) -> SourceLocation {
        Unit::location(self)
    }
}

fn member_location(graph: &UnitGraph, owner: UnitId, line: u32) -> SourceLocation {
    let unit = graph.unit(owner);
    SourceLocation::new(&unit.name, unit.source_file.clone(), line)
}

impl Selectable for Member {
    const NOUN: &'static str = "members";

    fn select(graph: &UnitGraph) -> Vec<&Self> {
        graph.members().iter().collect()
    }

    fn element_name(&self, _graph: &UnitGraph) -> String {
        self.full_name().to_string()
    }

    fn describe(&self, _graph: &UnitGraph) -> String {
        Member::describe(self)
    }

    fn location(&self, graph: &UnitGraph) -> SourceLocation {
        member_location(graph, self.info().owner, self.info().line)
    }
}

macro_rules! selectable_member {
    ($ty:ident, $noun:literal, $accessor:ident, $kind:ident) => {
        impl Selectable for $ty {
            const NOUN: &'static str = $noun;

            fn select(graph: &UnitGraph) -> Vec<&Self> {
                graph.members().iter().filter_map(Member::$accessor).collect()
            }

            fn element_name(&self, _graph: &UnitGraph) -> String {
                self.info.full_name.clone()
            }

            fn describe(&self, _graph: &UnitGraph) -> String {
                describe(MemberKind::$kind, &self.info.full_name)
            }

            fn location(&self, graph: &UnitGraph) -> SourceLocation {
                member_location(graph, self.info.owner, self.info.line)
            }
        }
    };
}

selectable_member!(Field, "fields", as_field, Field);
selectable_member!(Method, "methods", as_method, Method);
selectable_member!(Constructor, "constructors", as_constructor, Constructor);
