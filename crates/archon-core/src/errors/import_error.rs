//! Import pipeline errors.

use super::error_code::ArchonErrorCode;
use super::{ConfigError, LocateError, MalformedUnitError, ResolutionError};

/// Errors that abort an import.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Locate error: {0}")]
    Locate(#[from] LocateError),

    #[error("Malformed unit {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: MalformedUnitError,
    },

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ArchonErrorCode for ImportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Locate(e) => e.error_code(),
            Self::Malformed { source, .. } => source.error_code(),
            Self::Resolution(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
