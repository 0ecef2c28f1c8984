//! Tests for the Archon event system.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use archon_core::events::dispatcher::EventDispatcher;
use archon_core::events::handler::ArchonEventHandler;
use archon_core::events::types::*;

/// A test handler that counts events.
#[derive(Default)]
struct CountingHandler {
    stubs: AtomicUsize,
    skipped: AtomicUsize,
    violations: AtomicUsize,
}

impl ArchonEventHandler for CountingHandler {
    fn on_stub_created(&self, _event: &StubCreatedEvent) {
        self.stubs.fetch_add(1, Ordering::Relaxed);
    }

    fn on_unit_skipped(&self, _event: &UnitSkippedEvent) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn on_violation_detected(&self, _event: &ViolationDetectedEvent) {
        self.violations.fetch_add(1, Ordering::Relaxed);
    }
}

struct PanickingHandler;

impl ArchonEventHandler for PanickingHandler {
    fn on_stub_created(&self, _event: &StubCreatedEvent) {
        panic!("handler bug");
    }
}

#[test]
fn test_handler_noop_defaults() {
    struct NoopHandler;
    impl ArchonEventHandler for NoopHandler {}

    let handler = NoopHandler;
    handler.on_import_started(&ImportStartedEvent { source_count: 3 });
    handler.on_import_complete(&ImportCompleteEvent {
        units: 1,
        stubs: 0,
        dependencies: 0,
        warnings: 0,
        duration_ms: 1,
    });
    handler.on_rule_evaluated(&RuleEvaluatedEvent {
        rule: "r".into(),
        checked: 0,
        violations: 0,
        duration_ms: 0,
    });
}

#[test]
fn test_dispatcher_routes_to_all_handlers() {
    let first = Arc::new(CountingHandler::default());
    let second = Arc::new(CountingHandler::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(first.clone());
    dispatcher.register(second.clone());
    assert_eq!(dispatcher.handler_count(), 2);

    dispatcher.emit_stub_created(&StubCreatedEvent {
        name: "b.Baz".into(),
        referenced_by: "a.Foo".into(),
    });
    dispatcher.emit_unit_skipped(&UnitSkippedEvent {
        origin: "Broken.class".into(),
        reason: "bad magic".into(),
    });

    assert_eq!(first.stubs.load(Ordering::Relaxed), 1);
    assert_eq!(second.stubs.load(Ordering::Relaxed), 1);
    assert_eq!(first.skipped.load(Ordering::Relaxed), 1);
    assert_eq!(first.violations.load(Ordering::Relaxed), 0);
}

#[test]
fn test_panicking_handler_does_not_block_others() {
    let counter = Arc::new(CountingHandler::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(Arc::new(PanickingHandler));
    dispatcher.register(counter.clone());

    dispatcher.emit_stub_created(&StubCreatedEvent {
        name: "b.Baz".into(),
        referenced_by: "a.Foo".into(),
    });

    assert_eq!(counter.stubs.load(Ordering::Relaxed), 1);
}

#[test]
fn test_empty_dispatcher_is_noop() {
    let dispatcher = EventDispatcher::default();
    dispatcher.emit_violation_detected(&ViolationDetectedEvent {
        rule: "r".into(),
        element: "a.Foo".into(),
        message: "m".into(),
    });
    assert_eq!(dispatcher.handler_count(), 0);
}
