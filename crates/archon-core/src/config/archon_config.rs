//! Top-level Archon configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{EvaluationConfig, ImportConfig, ResolutionConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (applied via `apply_overrides`)
/// 2. Environment variables (`ARCHON_*`)
/// 3. Project config (`archon.toml` in the project root)
/// 4. User config (`~/.archon/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArchonConfig {
    pub import: ImportConfig,
    pub resolution: ResolutionConfig,
    pub evaluation: EvaluationConfig,
}

/// Override values supplied by the embedding tool (highest priority).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub strict: Option<bool>,
    pub secondary_resolution: Option<bool>,
    pub max_depth: Option<u32>,
    pub fail_on_empty_should: Option<bool>,
}

impl ArchonConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(ConfigError::ParseError { .. }) => {
                        return Err(ConfigError::ParseError {
                            path: user_config_path.display().to_string(),
                            message: "invalid TOML in user config".to_string(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join("archon.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing and embedding).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &ArchonConfig) -> Result<(), ConfigError> {
        if config.import.threads == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "import.threads".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.resolution.lookup_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "resolution.lookup_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for (field, patterns) in [
            ("import.exclude", &config.import.exclude),
            ("resolution.always_resolve", &config.resolution.always_resolve),
        ] {
            for pattern in patterns {
                if let Err(e) = glob::Pattern::new(pattern) {
                    return Err(ConfigError::ValidationFailed {
                        field: field.to_string(),
                        message: format!("invalid glob '{pattern}': {e}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.archon/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".archon").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are ignored.
    fn merge_toml_file(config: &mut ArchonConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: ArchonConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut ArchonConfig, other: &ArchonConfig) {
        // Import
        if other.import.strict.is_some() {
            base.import.strict = other.import.strict;
        }
        if other.import.threads.is_some() {
            base.import.threads = other.import.threads;
        }
        if !other.import.exclude.is_empty() {
            base.import.exclude = other.import.exclude.clone();
        }

        // Resolution
        if other.resolution.secondary_resolution.is_some() {
            base.resolution.secondary_resolution = other.resolution.secondary_resolution;
        }
        if other.resolution.max_depth.is_some() {
            base.resolution.max_depth = other.resolution.max_depth;
        }
        if other.resolution.create_stubs.is_some() {
            base.resolution.create_stubs = other.resolution.create_stubs;
        }
        if other.resolution.lookup_timeout_ms.is_some() {
            base.resolution.lookup_timeout_ms = other.resolution.lookup_timeout_ms;
        }
        if !other.resolution.always_resolve.is_empty() {
            base.resolution.always_resolve = other.resolution.always_resolve.clone();
        }

        // Evaluation
        if other.evaluation.fail_on_empty_should.is_some() {
            base.evaluation.fail_on_empty_should = other.evaluation.fail_on_empty_should;
        }
        if other.evaluation.parallel.is_some() {
            base.evaluation.parallel = other.evaluation.parallel;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `ARCHON_IMPORT_STRICT`, `ARCHON_RESOLUTION_MAX_DEPTH`, etc.
    fn apply_env_overrides(config: &mut ArchonConfig) {
        if let Some(v) = env_parse::<bool>("ARCHON_IMPORT_STRICT") {
            config.import.strict = Some(v);
        }
        if let Some(v) = env_parse::<usize>("ARCHON_IMPORT_THREADS") {
            config.import.threads = Some(v);
        }
        if let Some(v) = env_parse::<bool>("ARCHON_RESOLUTION_SECONDARY") {
            config.resolution.secondary_resolution = Some(v);
        }
        if let Some(v) = env_parse::<u32>("ARCHON_RESOLUTION_MAX_DEPTH") {
            config.resolution.max_depth = Some(v);
        }
        if let Some(v) = env_parse::<bool>("ARCHON_RESOLUTION_CREATE_STUBS") {
            config.resolution.create_stubs = Some(v);
        }
        if let Some(v) = env_parse::<u64>("ARCHON_RESOLUTION_LOOKUP_TIMEOUT_MS") {
            config.resolution.lookup_timeout_ms = Some(v);
        }
        if let Some(v) = env_parse::<bool>("ARCHON_EVALUATION_FAIL_ON_EMPTY_SHOULD") {
            config.evaluation.fail_on_empty_should = Some(v);
        }
    }

    /// Apply programmatic overrides (highest priority).
    pub fn apply_overrides(config: &mut ArchonConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.strict {
            config.import.strict = Some(v);
        }
        if let Some(v) = overrides.secondary_resolution {
            config.resolution.secondary_resolution = Some(v);
        }
        if let Some(v) = overrides.max_depth {
            config.resolution.max_depth = Some(v);
        }
        if let Some(v) = overrides.fail_on_empty_should {
            config.evaluation.fail_on_empty_should = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
