//! Domain model: units, members, annotations, edges, packages, and the
//! immutable [`UnitGraph`] that owns them.

pub mod annotation;
pub mod edges;
pub mod graph;
pub mod member;
pub mod traits;
pub mod types;
pub mod unit;

pub use annotation::{Annotation, AnnotationValue};
pub use edges::{Access, AccessTarget, Dependency, DependencyCause, Direction, Package};
pub use graph::UnitGraph;
pub use member::{Constructor, Field, Member, MemberInfo, Method};
pub use traits::{HasAnnotations, HasModifiers, HasName, HasOwner};
pub use types::{
    AccessKind, DependencyKind, MemberKind, Modifier, Modifiers, SourceLocation,
    TypeReferenceKind, UnitKind, Visibility,
};
pub use unit::Unit;
