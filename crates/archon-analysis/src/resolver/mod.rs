//! Graph resolution: turns raw units into a linked [`UnitGraph`](crate::domain::UnitGraph),
//! pulling missing references from an auxiliary class path and creating
//! stubs for whatever stays unresolved.

mod builder;
pub mod names;
mod options;

pub use builder::{GraphResolver, Resolution};
pub use options::ResolverOptions;
