//! Core types, errors, configuration, events, and tracing for Archon.
//!
//! Everything in this crate is shared by the analysis pipeline: the error
//! taxonomy, the layered configuration, the lifecycle event system, and the
//! handle/collection types the unit graph is built from.

pub mod config;
pub mod errors;
pub mod events;
pub mod tracing;
pub mod types;
