//! Non-fatal degradations recorded during an import.

use std::fmt;

use serde::Serialize;

/// Something the import tolerated instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImportWarning {
    /// A source entry could not be located or decoded (lenient mode only).
    SkippedUnit { origin: String, reason: String },
    /// Two sources provided the same unit; the later one was kept.
    DuplicateUnit {
        name: String,
        kept_origin: String,
        dropped_origin: String,
    },
    /// An auxiliary lookup exceeded its timeout; the unit became a stub.
    LookupTimedOut { name: String, timeout_ms: u64 },
    /// An auxiliary lookup failed or returned undecodable bytes; the unit
    /// became a stub.
    LookupFailed { name: String, reason: String },
    /// The naming convention and the nesting attributes disagree about the
    /// enclosing unit; the attribute was used.
    EnclosingMismatch {
        unit: String,
        by_name: String,
        by_attribute: String,
    },
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SkippedUnit { origin, reason } => write!(f, "skipped {origin}: {reason}"),
            Self::DuplicateUnit {
                name,
                kept_origin,
                dropped_origin,
            } => write!(
                f,
                "duplicate unit {name}: kept {kept_origin}, dropped {dropped_origin}"
            ),
            Self::LookupTimedOut { name, timeout_ms } => {
                write!(f, "lookup of {name} timed out after {timeout_ms}ms; using a stub")
            }
            Self::LookupFailed { name, reason } => {
                write!(f, "lookup of {name} failed: {reason}; using a stub")
            }
            Self::EnclosingMismatch {
                unit,
                by_name,
                by_attribute,
            } => write!(
                f,
                "{unit}: name implies enclosing unit {by_name} but attributes declare {by_attribute}"
            ),
        }
    }
}
