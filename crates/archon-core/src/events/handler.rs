//! ArchonEventHandler trait with no-op defaults.

use super::types::*;

/// Trait for handling Archon events.
///
/// All methods have no-op default implementations, so handlers only need
/// to override the events they care about. The trait requires `Send + Sync`
/// because parsing and evaluation run on worker pools.
pub trait ArchonEventHandler: Send + Sync {
    // ---- Import Lifecycle ----
    fn on_import_started(&self, _event: &ImportStartedEvent) {}
    fn on_unit_skipped(&self, _event: &UnitSkippedEvent) {}
    fn on_duplicate_unit(&self, _event: &DuplicateUnitEvent) {}
    fn on_import_complete(&self, _event: &ImportCompleteEvent) {}

    // ---- Resolution ----
    fn on_stub_created(&self, _event: &StubCreatedEvent) {}
    fn on_secondary_lookup(&self, _event: &SecondaryLookupEvent) {}

    // ---- Evaluation ----
    fn on_rule_evaluated(&self, _event: &RuleEvaluatedEvent) {}
    fn on_violation_detected(&self, _event: &ViolationDetectedEvent) {}
}
