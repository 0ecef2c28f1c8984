//! Class-file decoding errors.

use super::error_code::{self, ArchonErrorCode};

/// Errors that make a single compiled unit unreadable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedUnitError {
    #[error("Bad magic number 0x{found:08X}")]
    BadMagic { found: u32 },

    #[error("Unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("Truncated data at offset {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("Invalid constant pool index {index} (expected {expected})")]
    InvalidConstant { index: u16, expected: &'static str },

    #[error("Unknown constant pool tag {tag} at entry {index}")]
    UnknownConstantTag { tag: u8, index: u16 },

    #[error("Invalid descriptor '{descriptor}'")]
    InvalidDescriptor { descriptor: String },

    #[error("Malformed {attribute} attribute: {message}")]
    MalformedAttribute {
        attribute: &'static str,
        message: String,
    },
}

impl ArchonErrorCode for MalformedUnitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion { .. } => error_code::UNSUPPORTED_VERSION,
            _ => error_code::MALFORMED_UNIT,
        }
    }
}
