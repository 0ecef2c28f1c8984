//! Graph resolution errors.

use super::error_code::{self, ArchonErrorCode};

/// Errors that abort graph resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// A reference could not be resolved and stub creation is disabled.
    #[error("Unresolved reference from {unit} to {reference}")]
    UnresolvedReference { unit: String, reference: String },
}

impl ArchonErrorCode for ResolutionError {
    fn error_code(&self) -> &'static str {
        error_code::UNRESOLVED_REFERENCE
    }
}
