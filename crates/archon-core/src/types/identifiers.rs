//! Arena handle types for the unit graph.
//!
//! Each handle wraps a `u32` index into one arena of the graph. A `UnitId`
//! cannot be accidentally used where a `MemberId` is expected.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create a handle from an arena index.
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// The arena index this handle addresses.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self::new(index)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// Unit (class, interface, stub, array, primitive) handle.
    UnitId
);

define_id!(
    /// Field, method, or constructor handle.
    MemberId
);

define_id!(
    /// Access edge handle.
    AccessId
);

define_id!(
    /// Dependency edge handle.
    DependencyId
);

define_id!(
    /// Package node handle.
    PackageId
);
