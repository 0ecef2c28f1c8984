//! Tests for the Archon configuration system.

use std::sync::Mutex;

use archon_core::config::{ArchonConfig, ConfigOverrides};
use archon_core::errors::ConfigError;

/// Serializes tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all ARCHON_ env vars and point HOME at an empty directory.
fn reset_env(home: &std::path::Path) {
    for key in [
        "ARCHON_IMPORT_STRICT",
        "ARCHON_IMPORT_THREADS",
        "ARCHON_RESOLUTION_SECONDARY",
        "ARCHON_RESOLUTION_MAX_DEPTH",
        "ARCHON_RESOLUTION_CREATE_STUBS",
        "ARCHON_RESOLUTION_LOOKUP_TIMEOUT_MS",
        "ARCHON_EVALUATION_FAIL_ON_EMPTY_SHOULD",
    ] {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", home);
}

#[test]
fn test_defaults() {
    let config = ArchonConfig::default();
    assert!(!config.import.effective_strict());
    assert!(!config.resolution.effective_secondary_resolution());
    assert_eq!(config.resolution.effective_max_depth(), 1);
    assert!(config.resolution.effective_create_stubs());
    assert_eq!(config.resolution.effective_lookup_timeout().as_millis(), 5_000);
    assert!(!config.evaluation.effective_fail_on_empty_should());
    assert!(config.evaluation.effective_parallel());
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    reset_env(home.path());

    let user_dir = home.path().join(".archon");
    std::fs::create_dir_all(&user_dir).unwrap();
    std::fs::write(
        user_dir.join("config.toml"),
        "[resolution]\nmax_depth = 7\nlookup_timeout_ms = 100\n",
    )
    .unwrap();

    let project = tempdir();
    std::fs::write(
        project.path().join("archon.toml"),
        r#"
[resolution]
max_depth = 3
secondary_resolution = true

[import]
strict = true
"#,
    )
    .unwrap();

    std::env::set_var("ARCHON_RESOLUTION_MAX_DEPTH", "5");

    let overrides = ConfigOverrides {
        strict: Some(false),
        ..Default::default()
    };
    let config = ArchonConfig::load(project.path(), Some(&overrides)).unwrap();

    // Overrides beat the project file.
    assert_eq!(config.import.strict, Some(false));
    // Env beats project and user.
    assert_eq!(config.resolution.max_depth, Some(5));
    // Project beats defaults.
    assert_eq!(config.resolution.secondary_resolution, Some(true));
    // User config survives where nothing overrides it.
    assert_eq!(config.resolution.lookup_timeout_ms, Some(100));

    reset_env(home.path());
}

#[test]
fn test_missing_files_fall_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    reset_env(home.path());

    let project = tempdir();
    let config = ArchonConfig::load(project.path(), None).unwrap();
    assert_eq!(config.resolution.max_depth, None);
    assert!(config.import.exclude.is_empty());
}

#[test]
fn test_invalid_project_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    reset_env(home.path());

    let project = tempdir();
    std::fs::write(project.path().join("archon.toml"), "[resolution\nmax_depth = ").unwrap();
    let err = ArchonConfig::load(project.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_validation_rejects_bad_values() {
    let err = ArchonConfig::from_toml("[import]\nthreads = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "import.threads"));

    let err = ArchonConfig::from_toml("[resolution]\nalways_resolve = [\"[\"]\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "resolution.always_resolve"));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = ArchonConfig::from_toml("[evaluation]\nparallel = false\nfuture_key = 1\n").unwrap();
    assert_eq!(config.evaluation.parallel, Some(false));
}

#[test]
fn test_toml_round_trip_preserves_patterns() {
    let config = ArchonConfig::from_toml(
        "[resolution]\nalways_resolve = [\"com.acme.*\"]\n[import]\nexclude = [\"**/test/**\"]\n",
    )
    .unwrap();
    let text = config.to_toml().unwrap();
    let back = ArchonConfig::from_toml(&text).unwrap();
    assert_eq!(back.resolution.always_resolve, vec!["com.acme.*".to_string()]);
    assert_eq!(back.import.exclude, vec!["**/test/**".to_string()]);
}
