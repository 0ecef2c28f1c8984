//! Archon analysis engine: class-file reading, unit location, graph
//! resolution, and architecture rule evaluation.
//!
//! Data flows leaf-first: [`locator`] finds class-file bytes, [`classfile`]
//! decodes them into raw records, [`resolver`] links the records into an
//! immutable [`domain::UnitGraph`], and [`lang`] rules are run against that
//! graph by [`evaluation`]. [`importer`] wires the first three together.

pub mod classfile;
pub mod domain;
pub mod evaluation;
pub mod importer;
pub mod lang;
pub mod locator;
pub mod resolver;

pub use domain::UnitGraph;
pub use evaluation::{EvaluatedRules, EvaluationResult, FailureReport};
pub use importer::{ClassFileImporter, ImportWarning, Imported};
