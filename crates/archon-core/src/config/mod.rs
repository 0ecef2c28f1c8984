//! Configuration system for Archon.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod archon_config;
pub mod evaluation_config;
pub mod import_config;
pub mod resolution_config;

pub use archon_config::{ArchonConfig, ConfigOverrides};
pub use evaluation_config::EvaluationConfig;
pub use import_config::ImportConfig;
pub use resolution_config::ResolutionConfig;
