//! EventDispatcher: synchronous event dispatch, zero overhead when empty.

use std::sync::Arc;

use super::handler::ArchonEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn ArchonEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn ArchonEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// A panicking handler does not prevent later handlers from receiving it.
    fn emit<F: Fn(&dyn ArchonEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("event handler panicked; continuing with remaining handlers");
            }
        }
    }

    // ---- Import Lifecycle ----
    pub fn emit_import_started(&self, event: &ImportStartedEvent) {
        self.emit(|h| h.on_import_started(event));
    }

    pub fn emit_unit_skipped(&self, event: &UnitSkippedEvent) {
        self.emit(|h| h.on_unit_skipped(event));
    }

    pub fn emit_duplicate_unit(&self, event: &DuplicateUnitEvent) {
        self.emit(|h| h.on_duplicate_unit(event));
    }

    pub fn emit_import_complete(&self, event: &ImportCompleteEvent) {
        self.emit(|h| h.on_import_complete(event));
    }

    // ---- Resolution ----
    pub fn emit_stub_created(&self, event: &StubCreatedEvent) {
        self.emit(|h| h.on_stub_created(event));
    }

    pub fn emit_secondary_lookup(&self, event: &SecondaryLookupEvent) {
        self.emit(|h| h.on_secondary_lookup(event));
    }

    // ---- Evaluation ----
    pub fn emit_rule_evaluated(&self, event: &RuleEvaluatedEvent) {
        self.emit(|h| h.on_rule_evaluated(event));
    }

    pub fn emit_violation_detected(&self, event: &ViolationDetectedEvent) {
        self.emit(|h| h.on_violation_detected(event));
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
