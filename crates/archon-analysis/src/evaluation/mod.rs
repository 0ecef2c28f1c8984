//! Evaluation engine: runs rules, normalizes events, renders reports.

mod accumulator;
mod engine;
mod result;

pub use accumulator::EvaluatedRules;
pub(crate) use engine::check_elements;
pub use engine::{evaluate, EvaluationOptions, RuleEvaluator};
pub use result::{EvaluationResult, FailureReport, Violation};
