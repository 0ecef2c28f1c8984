//! Data structures shared across Archon: Fx collections, SmallVec aliases,
//! and typed arena handles.

pub mod collections;
pub mod identifiers;

pub use collections::{FxHashMap, FxHashSet};
pub use identifiers::{AccessId, DependencyId, MemberId, PackageId, UnitId};
