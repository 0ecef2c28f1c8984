//! UnitLocator: finds class files in directories, archives (including
//! archives nested in archives), and memory, plus the auxiliary class path
//! consulted by the resolver for references outside the imported set.

pub mod class_path;
pub mod types;
pub mod walker;

pub use class_path::{ClassPath, LookupWorker, MemoryLookup, UnitLookup, MAX_LOOKUP_THREADS};
pub use types::{entry_name, LocatedUnit, UnitSource};
pub use walker::{locate, Locate};
