//! Graph query errors.

use super::error_code::{self, ArchonErrorCode};

/// Errors returned by lookups against a finished unit graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("{unit} has no member {member}{}", stub_suffix(.unit_is_stub))]
    MemberNotFound {
        unit: String,
        member: String,
        unit_is_stub: bool,
    },

    #[error("Unit not found: {name}")]
    UnitNotFound { name: String },
}

fn stub_suffix(unit_is_stub: &bool) -> &'static str {
    if *unit_is_stub {
        " (unit is a stub)"
    } else {
        ""
    }
}

impl ArchonErrorCode for QueryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MemberNotFound { .. } => error_code::MEMBER_NOT_FOUND,
            Self::UnitNotFound { .. } => error_code::UNIT_NOT_FOUND,
        }
    }
}
