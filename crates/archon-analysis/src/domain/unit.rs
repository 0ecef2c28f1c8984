//! Unit nodes.

use archon_core::types::collections::SmallVec4;
use archon_core::types::{AccessId, DependencyId, MemberId, PackageId, UnitId};

use super::annotation::Annotation;
use super::types::{Modifiers, SourceLocation, UnitKind};

/// One class, interface, enum, annotation type, array, or primitive.
///
/// A stub is a unit that was referenced but never imported; it carries a
/// name and a kind, and no members, annotations, or outgoing edges.
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    /// Empty for anonymous units.
    pub simple_name: String,
    pub package_name: String,
    pub kind: UnitKind,
    pub modifiers: Modifiers,
    pub is_stub: bool,
    pub source_file: Option<String>,
    pub superclass: Option<UnitId>,
    pub interfaces: SmallVec4<UnitId>,
    pub enclosing: Option<UnitId>,
    /// Component type of an array unit.
    pub component: Option<UnitId>,
    pub package: PackageId,
    pub members: Vec<MemberId>,
    pub annotations: Vec<Annotation>,
    pub(crate) outgoing: Vec<DependencyId>,
    pub(crate) incoming: Vec<DependencyId>,
    pub(crate) accesses_from: Vec<AccessId>,
    pub(crate) accesses_to: Vec<AccessId>,
}

impl Unit {
    pub fn is_stub(&self) -> bool {
        self.is_stub
    }

    pub fn is_array(&self) -> bool {
        self.kind == UnitKind::Array
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == UnitKind::Primitive
    }

    pub fn is_interface(&self) -> bool {
        self.kind == UnitKind::Interface || self.kind == UnitKind::Annotation
    }

    pub fn is_nested(&self) -> bool {
        self.enclosing.is_some()
    }

    pub fn is_anonymous(&self) -> bool {
        self.simple_name.is_empty() && !self.is_array() && !self.is_primitive()
    }

    /// Dependencies this unit originates.
    pub fn outgoing_dependencies(&self) -> &[DependencyId] {
        &self.outgoing
    }

    /// Dependencies that target this unit.
    pub fn incoming_dependencies(&self) -> &[DependencyId] {
        &self.incoming
    }

    /// Accesses made from this unit's code.
    pub fn accesses_from_self(&self) -> &[AccessId] {
        &self.accesses_from
    }

    /// Accesses whose target owner is this unit.
    pub fn accesses_to_self(&self) -> &[AccessId] {
        &self.accesses_to
    }

    /// Location of the unit declaration, used for unit-level messages.
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(&self.name, self.source_file.clone(), 0)
    }

    /// `Unit <com.acme.Foo>`.
    pub fn describe(&self) -> String {
        format!("Unit <{}>", self.name)
    }
}
