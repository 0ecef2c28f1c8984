//! Error handling for Archon.
//! One error enum per subsystem, `thiserror` only.

pub mod config_error;
pub mod error_code;
pub mod import_error;
pub mod locate_error;
pub mod malformed_unit_error;
pub mod query_error;
pub mod resolution_error;
pub mod rule_evaluation_error;

pub use config_error::ConfigError;
pub use error_code::ArchonErrorCode;
pub use import_error::ImportError;
pub use locate_error::LocateError;
pub use malformed_unit_error::MalformedUnitError;
pub use query_error::QueryError;
pub use resolution_error::ResolutionError;
pub use rule_evaluation_error::{BoxError, RuleEvaluationError};
