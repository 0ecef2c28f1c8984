//! ArchonErrorCode trait for structured error codes.

/// Trait for mapping Archon errors to stable error code strings.
/// Every error enum implements this so callers (and external reporters)
/// can branch on a code instead of matching display text.
pub trait ArchonErrorCode {
    /// Returns the error code string (e.g., "MALFORMED_UNIT").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted coded string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const MALFORMED_UNIT: &str = "MALFORMED_UNIT";
pub const UNSUPPORTED_VERSION: &str = "UNSUPPORTED_VERSION";
pub const LOCATE_ERROR: &str = "LOCATE_ERROR";
pub const LOOKUP_TIMEOUT: &str = "LOOKUP_TIMEOUT";
pub const UNRESOLVED_REFERENCE: &str = "UNRESOLVED_REFERENCE";
pub const MEMBER_NOT_FOUND: &str = "MEMBER_NOT_FOUND";
pub const UNIT_NOT_FOUND: &str = "UNIT_NOT_FOUND";
pub const RULE_EVALUATION_ERROR: &str = "RULE_EVALUATION_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
