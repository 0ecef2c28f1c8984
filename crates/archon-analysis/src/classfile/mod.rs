//! BinaryUnitReader: decodes JVM class files into unlinked [`RawUnit`]s.
//!
//! Reading is pure and never resolves a name, so many files can be decoded
//! in parallel before resolution starts.

mod bytecode;
mod bytes;
mod constant_pool;
pub mod descriptor;
pub mod reader;
pub mod types;

pub use reader::{read, MAX_MAJOR_VERSION, MIN_MAJOR_VERSION};
pub use types::{
    RawAccess, RawAnnotation, RawAnnotationValue, RawEnclosingMethod, RawMember, RawNesting,
    RawTypeReference, RawUnit,
};
