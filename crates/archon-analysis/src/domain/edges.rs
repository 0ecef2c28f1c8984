//! Access and dependency edges, and packages.

use archon_core::types::{AccessId, DependencyId, MemberId, PackageId, UnitId};
use serde::Serialize;

use super::types::{AccessKind, DependencyKind, SourceLocation};

/// What an access points at. The member is resolved against the named
/// owner and its supertypes; unresolvable targets keep only their names.
#[derive(Debug, Clone)]
pub struct AccessTarget {
    pub owner: UnitId,
    pub name: String,
    pub descriptor: String,
    pub full_name: String,
    pub resolved: Option<MemberId>,
}

/// One member accessing a member of another unit.
#[derive(Debug, Clone)]
pub struct Access {
    pub id: AccessId,
    pub kind: AccessKind,
    pub origin: MemberId,
    pub origin_unit: UnitId,
    pub target: AccessTarget,
    pub location: SourceLocation,
    /// `Method <A.m()> calls method <B.n()>`.
    pub description: String,
}

impl Access {
    /// Description plus location, as printed in violation details.
    pub fn message(&self) -> String {
        format!("{} in {}", self.description, self.location)
    }
}

/// One concrete relation a dependency was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyCause {
    pub description: String,
    pub location: SourceLocation,
}

impl DependencyCause {
    pub fn message(&self) -> String {
        format!("{} in {}", self.description, self.location)
    }
}

/// Unit-to-unit edge, unique per `(origin, target, kind)`.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub id: DependencyId,
    pub origin: UnitId,
    pub target: UnitId,
    pub kind: DependencyKind,
    /// Never empty.
    pub causes: Vec<DependencyCause>,
}

/// Which side of an edge a query starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Hierarchical package node. The root package has an empty name.
#[derive(Debug, Clone)]
pub struct Package {
    pub id: PackageId,
    pub name: String,
    /// Last segment of the name.
    pub simple_name: String,
    pub parent: Option<PackageId>,
    pub children: Vec<PackageId>,
    /// Direct member units; arrays and primitives are never members.
    pub units: Vec<UnitId>,
}

impl Package {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
