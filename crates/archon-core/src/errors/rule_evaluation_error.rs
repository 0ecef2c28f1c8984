//! Rule evaluation errors.

use super::error_code::{self, ArchonErrorCode};

/// Boxed cause retained from a failing condition.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while a rule's condition runs against a selected element.
/// Conditions are caller-supplied, so the original cause is kept.
#[derive(Debug, thiserror::Error)]
pub enum RuleEvaluationError {
    #[error("Condition of rule '{rule}' failed on {element}: {source}")]
    ConditionFailed {
        rule: String,
        element: String,
        #[source]
        source: BoxError,
    },

    #[error("Condition of rule '{rule}' panicked on {element}: {message}")]
    ConditionPanicked {
        rule: String,
        element: String,
        message: String,
    },
}

impl RuleEvaluationError {
    /// The description of the element the condition failed on.
    pub fn element(&self) -> &str {
        match self {
            Self::ConditionFailed { element, .. } | Self::ConditionPanicked { element, .. } => {
                element
            }
        }
    }
}

impl ArchonErrorCode for RuleEvaluationError {
    fn error_code(&self) -> &'static str {
        error_code::RULE_EVALUATION_ERROR
    }
}
