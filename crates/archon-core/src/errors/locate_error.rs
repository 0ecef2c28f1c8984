//! Unit location errors.

use std::path::PathBuf;

use super::error_code::{self, ArchonErrorCode};

/// Errors that can occur while enumerating or fetching binary units.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error in {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("Lookup of {name} timed out after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },

    #[error("Lookup of {name} failed: {message}")]
    LookupFailed { name: String, message: String },
}

impl LocateError {
    /// The path or unit name the error is about.
    pub fn origin(&self) -> String {
        match self {
            Self::Io { path, .. } | Self::Archive { path, .. } => path.display().to_string(),
            Self::Timeout { name, .. } | Self::LookupFailed { name, .. } => name.clone(),
        }
    }
}

impl ArchonErrorCode for LocateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => error_code::LOOKUP_TIMEOUT,
            _ => error_code::LOCATE_ERROR,
        }
    }
}
