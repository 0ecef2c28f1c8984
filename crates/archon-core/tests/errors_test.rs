//! Tests for the Archon error handling system.

use std::collections::HashSet;

use archon_core::errors::error_code::{self, ArchonErrorCode};
use archon_core::errors::*;

/// Every error enum carries a non-empty code.
#[test]
fn test_all_errors_have_error_code() {
    let malformed = MalformedUnitError::BadMagic { found: 0xDEAD_BEEF };
    assert_eq!(malformed.error_code(), error_code::MALFORMED_UNIT);

    let version = MalformedUnitError::UnsupportedVersion { major: 99, minor: 0 };
    assert_eq!(version.error_code(), error_code::UNSUPPORTED_VERSION);

    let locate = LocateError::Timeout {
        name: "com.example.Foo".into(),
        timeout_ms: 10,
    };
    assert_eq!(locate.error_code(), error_code::LOOKUP_TIMEOUT);

    let resolution = ResolutionError::UnresolvedReference {
        unit: "com.example.Foo".into(),
        reference: "com.example.Bar".into(),
    };
    assert_eq!(resolution.error_code(), error_code::UNRESOLVED_REFERENCE);

    let query = QueryError::UnitNotFound { name: "x".into() };
    assert_eq!(query.error_code(), error_code::UNIT_NOT_FOUND);

    let rule = RuleEvaluationError::ConditionPanicked {
        rule: "r".into(),
        element: "e".into(),
        message: "boom".into(),
    };
    assert_eq!(rule.error_code(), error_code::RULE_EVALUATION_ERROR);

    let config = ConfigError::FileNotFound { path: "/tmp".into() };
    assert_eq!(config.error_code(), error_code::CONFIG_ERROR);
}

#[test]
fn test_from_conversions_into_import_error() {
    let resolution = ResolutionError::UnresolvedReference {
        unit: "a.A".into(),
        reference: "b.B".into(),
    };
    let import: ImportError = resolution.into();
    assert!(matches!(import, ImportError::Resolution(_)));
    assert_eq!(import.error_code(), error_code::UNRESOLVED_REFERENCE);

    let config = ConfigError::ValidationFailed {
        field: "f".into(),
        message: "m".into(),
    };
    let import: ImportError = config.into();
    assert_eq!(import.error_code(), error_code::CONFIG_ERROR);

    let import = ImportError::Malformed {
        origin: "Foo.class".into(),
        source: MalformedUnitError::UnsupportedVersion { major: 70, minor: 0 },
    };
    assert_eq!(import.error_code(), error_code::UNSUPPORTED_VERSION);
}

#[test]
fn test_coded_string_format() {
    let err = ResolutionError::UnresolvedReference {
        unit: "com.example.Foo".into(),
        reference: "com.example.Baz".into(),
    };
    assert_eq!(
        err.coded_string(),
        "[UNRESOLVED_REFERENCE] Unresolved reference from com.example.Foo to com.example.Baz"
    );
}

#[test]
fn test_member_not_found_mentions_stub() {
    let on_stub = QueryError::MemberNotFound {
        unit: "b.Baz".into(),
        member: "run()".into(),
        unit_is_stub: true,
    };
    assert_eq!(on_stub.to_string(), "b.Baz has no member run() (unit is a stub)");

    let resolved = QueryError::MemberNotFound {
        unit: "a.Foo".into(),
        member: "run()".into(),
        unit_is_stub: false,
    };
    assert_eq!(resolved.to_string(), "a.Foo has no member run()");
}

#[test]
fn test_condition_failure_keeps_source() {
    use std::error::Error;

    let cause: BoxError = "custom condition broke".into();
    let err = RuleEvaluationError::ConditionFailed {
        rule: "units should be fine".into(),
        element: "a.Foo".into(),
        source: cause,
    };
    assert_eq!(err.element(), "a.Foo");
    let source = err.source().expect("cause retained");
    assert_eq!(source.to_string(), "custom condition broke");
}

#[test]
fn test_locate_error_origin_is_the_path_or_name() {
    let archive = LocateError::Archive {
        path: "lib/broken.jar".into(),
        message: "invalid Zip archive".into(),
    };
    assert_eq!(archive.origin(), "lib/broken.jar");
    assert_ne!(archive.origin(), archive.to_string());

    let io = LocateError::Io {
        path: "classes".into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };
    assert_eq!(io.origin(), "classes");

    let failed = LocateError::LookupFailed {
        name: "a.Foo".into(),
        message: "boom".into(),
    };
    assert_eq!(failed.origin(), "a.Foo");
}

#[test]
fn test_error_codes_are_unique() {
    let codes = [
        error_code::MALFORMED_UNIT,
        error_code::UNSUPPORTED_VERSION,
        error_code::LOCATE_ERROR,
        error_code::LOOKUP_TIMEOUT,
        error_code::UNRESOLVED_REFERENCE,
        error_code::MEMBER_NOT_FOUND,
        error_code::UNIT_NOT_FOUND,
        error_code::RULE_EVALUATION_ERROR,
        error_code::CONFIG_ERROR,
    ];
    let unique: HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), codes.len());
}
