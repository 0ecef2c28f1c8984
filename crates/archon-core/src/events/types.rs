//! Event payload types for import and evaluation lifecycles.

/// Payload for `on_import_started`.
#[derive(Debug, Clone)]
pub struct ImportStartedEvent {
    pub source_count: usize,
}

/// Payload for `on_unit_skipped`.
#[derive(Debug, Clone)]
pub struct UnitSkippedEvent {
    pub origin: String,
    pub reason: String,
}

/// Payload for `on_duplicate_unit`.
#[derive(Debug, Clone)]
pub struct DuplicateUnitEvent {
    pub name: String,
    pub kept_origin: String,
    pub dropped_origin: String,
}

/// Payload for `on_stub_created`.
#[derive(Debug, Clone)]
pub struct StubCreatedEvent {
    pub name: String,
    pub referenced_by: String,
}

/// Payload for `on_secondary_lookup`.
#[derive(Debug, Clone)]
pub struct SecondaryLookupEvent {
    pub name: String,
    pub found: bool,
    pub timed_out: bool,
}

/// Payload for `on_import_complete`.
#[derive(Debug, Clone)]
pub struct ImportCompleteEvent {
    pub units: usize,
    pub stubs: usize,
    pub dependencies: usize,
    pub warnings: usize,
    pub duration_ms: u64,
}

/// Payload for `on_rule_evaluated`.
#[derive(Debug, Clone)]
pub struct RuleEvaluatedEvent {
    pub rule: String,
    pub checked: usize,
    pub violations: usize,
    pub duration_ms: u64,
}

/// Payload for `on_violation_detected`.
#[derive(Debug, Clone)]
pub struct ViolationDetectedEvent {
    pub rule: String,
    pub element: String,
    pub message: String,
}
