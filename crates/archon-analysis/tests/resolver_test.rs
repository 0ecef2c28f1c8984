//! Tests for graph resolution: linking, stubs, secondary lookup, and the
//! structural guarantees of the resolved graph.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use archon_analysis::classfile;
use archon_analysis::domain::{AccessKind, DependencyKind, Direction, UnitKind};
use archon_analysis::locator::{MemoryLookup, UnitLookup, UnitSource};
use archon_analysis::resolver::{GraphResolver, ResolverOptions};
use archon_analysis::{ClassFileImporter, ImportWarning, UnitGraph};
use archon_core::config::{ArchonConfig, ImportConfig, ResolutionConfig};
use archon_core::errors::{ImportError, LocateError, QueryError, ResolutionError};
use archon_core::events::{ArchonEventHandler, EventDispatcher, SecondaryLookupEvent, StubCreatedEvent};
use archon_fixtures::{method_descriptor, AnnotationSpec, ClassFileBuilder, FieldSpec, MethodSpec};
use proptest::prelude::*;

fn import(classes: Vec<ClassFileBuilder>) -> UnitGraph {
    import_with(ArchonConfig::default(), classes).graph
}

fn import_with(config: ArchonConfig, classes: Vec<ClassFileBuilder>) -> archon_analysis::Imported {
    let units = classes
        .iter()
        .enumerate()
        .map(|(i, c)| (format!("memory:{i}"), c.build()))
        .collect();
    ClassFileImporter::new(config).import_bytes(units).unwrap()
}

fn secondary(max_depth: u32) -> ArchonConfig {
    ArchonConfig {
        resolution: ResolutionConfig {
            secondary_resolution: Some(true),
            max_depth: Some(max_depth),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Outgoing dependency targets of `name`, excluding `java.lang.Object`.
fn targets(graph: &UnitGraph, name: &str) -> Vec<String> {
    let unit = graph.unit_by_name(name).unwrap();
    let mut targets: Vec<String> = graph
        .dependencies_of(unit.id, Direction::Outgoing)
        .map(|d| graph.unit(d.target).name.clone())
        .filter(|n| n != "java.lang.Object")
        .collect();
    targets.dedup();
    targets
}

// ---- End-to-end resolution ----

#[test]
fn test_reference_to_imported_unit_links_to_it() {
    let graph = import(vec![
        ClassFileBuilder::class("a.Foo").field(FieldSpec::new("bar", "a.Bar")),
        ClassFileBuilder::class("a.Bar"),
    ]);

    let foo = graph.unit_by_name("a.Foo").unwrap();
    let to_bar: Vec<_> = graph
        .dependencies_of(foo.id, Direction::Outgoing)
        .filter(|d| graph.unit(d.target).name == "a.Bar")
        .collect();
    assert_eq!(to_bar.len(), 1);
    assert_eq!(to_bar[0].kind, DependencyKind::FieldType);
    assert!(!graph.unit(to_bar[0].target).is_stub());
    assert_eq!(
        to_bar[0].causes[0].message(),
        "Field <a.Foo.bar> has type <a.Bar> in (Foo.java:0)"
    );
}

#[test]
fn test_reference_to_missing_unit_creates_stub() {
    let graph = import(vec![ClassFileBuilder::class("a.Foo").field(FieldSpec::new("baz", "b.Baz"))]);

    let baz = graph.unit_by_name("b.Baz").unwrap();
    assert!(baz.is_stub());
    assert!(baz.members.is_empty());
    assert!(baz.outgoing_dependencies().is_empty());

    let foo = graph.unit_by_name("a.Foo").unwrap();
    let edge = graph
        .dependencies_of(foo.id, Direction::Outgoing)
        .find(|d| d.target == baz.id)
        .unwrap();
    assert!(graph.unit(edge.target).is_stub());
}

/// A nested unit whose enclosing unit was not imported gets a placeholder
/// owner.
#[test]
fn test_nested_unit_without_outer_gets_placeholder() {
    let graph = import(vec![ClassFileBuilder::class("a.Outer$Inner")]);

    let outer = graph.unit_by_name("a.Outer").unwrap();
    let inner = graph.unit_by_name("a.Outer$Inner").unwrap();
    assert!(outer.is_stub());
    assert_eq!(inner.enclosing, Some(outer.id));
    assert_eq!(graph.nested_units(outer.id), vec![inner.id]);
    assert_eq!(inner.simple_name, "Inner");
}

/// Placeholders that are nested themselves get their own placeholder.
#[test]
fn test_nested_placeholders_chain_outward() {
    let graph = import(vec![ClassFileBuilder::class("a.Outer$Inner$Deep")]);

    let deep = graph.unit_by_name("a.Outer$Inner$Deep").unwrap();
    let inner = graph.unit_by_name("a.Outer$Inner").unwrap();
    let outer = graph.unit_by_name("a.Outer").unwrap();
    assert!(inner.is_stub());
    assert!(outer.is_stub());
    assert_eq!(deep.enclosing, Some(inner.id));
    assert_eq!(inner.enclosing, Some(outer.id));
    assert!(inner.is_nested());
    assert!(!outer.is_nested());
    assert_eq!(graph.nested_units(outer.id), vec![inner.id]);
}

/// The placeholder exists even when stubs are otherwise disabled.
#[test]
fn test_placeholder_outer_survives_disabled_stubs() {
    let config = ArchonConfig {
        resolution: ResolutionConfig {
            create_stubs: Some(false),
            ..Default::default()
        },
        ..Default::default()
    };
    let imported = import_with(
        config,
        vec![
            ClassFileBuilder::class("java.lang.Object").no_super(),
            ClassFileBuilder::class("a.Outer$Inner"),
        ],
    );
    assert!(imported.graph.unit_by_name("a.Outer").unwrap().is_stub());
}

#[test]
fn test_disabled_stubs_report_first_unresolved_reference() {
    let config = ArchonConfig {
        resolution: ResolutionConfig {
            create_stubs: Some(false),
            ..Default::default()
        },
        ..Default::default()
    };
    let units = vec![(
        "memory:Foo".to_string(),
        ClassFileBuilder::class("a.Foo").field(FieldSpec::new("baz", "b.Baz")).build(),
    )];
    let err = ClassFileImporter::new(config).import_bytes(units).unwrap_err();
    match err {
        ImportError::Resolution(e) => assert_eq!(
            e,
            ResolutionError::UnresolvedReference {
                unit: "a.Foo".to_string(),
                reference: "b.Baz".to_string(),
            }
        ),
        other => panic!("expected a resolution error, got {other:?}"),
    }
}

#[test]
fn test_hierarchy_links_and_assignability() {
    let graph = import(vec![
        ClassFileBuilder::interface("a.Shape"),
        ClassFileBuilder::class("a.Base").implements("a.Shape"),
        ClassFileBuilder::class("a.Circle").super_class("a.Base"),
    ]);

    let shape = graph.unit_by_name("a.Shape").unwrap();
    let base = graph.unit_by_name("a.Base").unwrap();
    let circle = graph.unit_by_name("a.Circle").unwrap();

    assert_eq!(circle.superclass, Some(base.id));
    assert!(graph.is_assignable_to(circle.id, shape.id));
    assert!(graph.is_assignable_from(shape.id, circle.id));
    assert!(!graph.is_assignable_to(shape.id, circle.id));
    assert!(graph.is_assignable_to_name(circle.id, "java.lang.Object"));
    assert_eq!(
        graph.supertypes(circle.id),
        vec![base.id, graph.unit_by_name("java.lang.Object").unwrap().id, shape.id]
    );
}

#[test]
fn test_accesses_link_to_members_through_supertypes() {
    let graph = import(vec![
        ClassFileBuilder::class("a.Base").method(MethodSpec::new("run", "()V")),
        ClassFileBuilder::class("a.Child").super_class("a.Base"),
        ClassFileBuilder::class("a.Caller").method(
            MethodSpec::new("go", "()V")
                .calls("a.Child", "run", "()V", 10)
                .calls("a.Child", "missing", "()V", 11),
        ),
    ]);

    let caller = graph.unit_by_name("a.Caller").unwrap();
    let accesses: Vec<_> = graph.accesses_of(caller.id, Direction::Outgoing).collect();
    assert_eq!(accesses.len(), 2);

    let run = accesses[0];
    assert_eq!(run.kind, AccessKind::CallMethod);
    assert_eq!(graph.unit(run.target.owner).name, "a.Child");
    let resolved = graph.member(run.target.resolved.unwrap());
    assert_eq!(resolved.full_name(), "a.Base.run()");
    assert_eq!(
        run.message(),
        "Method <a.Caller.go()> calls method <a.Child.run()> in (Caller.java:10)"
    );

    // Unresolvable targets keep their names and still produce a dependency.
    let missing = accesses[1];
    assert_eq!(missing.target.resolved, None);
    assert_eq!(missing.target.full_name, "a.Child.missing()");

    let child = graph.unit_by_name("a.Child").unwrap();
    assert_eq!(child.accesses_to_self().len(), 2);
    let call_edges: Vec<_> = graph
        .dependencies_of(caller.id, Direction::Outgoing)
        .filter(|d| d.kind == DependencyKind::MethodCall)
        .collect();
    assert_eq!(call_edges.len(), 1);
    assert_eq!(call_edges[0].causes.len(), 2);
}

#[test]
fn test_member_queries() {
    let graph = import(vec![ClassFileBuilder::class("a.Foo")
        .method(MethodSpec::new("run", &method_descriptor(&["int"], "void")))]);
    let foo = graph.unit_by_name("a.Foo").unwrap();

    let run = graph.find_member(foo.id, "run", "(I)V").unwrap();
    assert_eq!(run.full_name(), "a.Foo.run(int)");

    let err = graph.find_member(foo.id, "stop", "()V").unwrap_err();
    assert_eq!(
        err,
        QueryError::MemberNotFound {
            unit: "a.Foo".to_string(),
            member: "stop()V".to_string(),
            unit_is_stub: false,
        }
    );

    let object = graph.unit_by_name("java.lang.Object").unwrap();
    let err = graph.find_member(object.id, "hashCode", "()I").unwrap_err();
    assert!(err.to_string().ends_with("(unit is a stub)"));

    assert_eq!(
        graph.require_unit("a.Nope").unwrap_err(),
        QueryError::UnitNotFound { name: "a.Nope".to_string() }
    );
}

/// Arrays and primitives are graph nodes; dependencies point at the
/// element type.
#[test]
fn test_array_types_depend_on_their_element_type() {
    let graph = import(vec![ClassFileBuilder::class("a.Foo")
        .field(FieldSpec::new("bars", "b.Bar[][]"))
        .field(FieldSpec::new("counts", "int[]"))]);

    let array = graph.unit_by_name("b.Bar[][]").unwrap();
    assert_eq!(array.kind, UnitKind::Array);
    let component = graph.unit(array.component.unwrap());
    assert_eq!(component.name, "b.Bar[]");
    assert_eq!(graph.unit(component.component.unwrap()).name, "b.Bar");
    assert_eq!(graph.unit_by_name("int").unwrap().kind, UnitKind::Primitive);

    assert_eq!(targets(&graph, "a.Foo"), vec!["b.Bar"]);
}

#[test]
fn test_code_type_references_become_dependencies() {
    let graph = import(vec![ClassFileBuilder::class("a.Foo").method(
        MethodSpec::new("check", &method_descriptor(&["java.lang.Object"], "boolean"))
            .instance_of("b.Shape", 4)
            .class_literal("b.Circle", 5),
    )]);

    let foo = graph.unit_by_name("a.Foo").unwrap();
    let mut messages: Vec<String> = graph
        .dependencies_of(foo.id, Direction::Outgoing)
        .filter(|d| d.kind == DependencyKind::TypeReference)
        .flat_map(|d| d.causes.iter().map(|c| c.message()))
        .collect();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            "Method <a.Foo.check(java.lang.Object)> checks instanceof <b.Shape> in (Foo.java:4)",
            "Method <a.Foo.check(java.lang.Object)> references class object <b.Circle> in (Foo.java:5)",
        ]
    );
}

#[test]
fn test_meta_annotations_are_followed() {
    let graph = import(vec![
        ClassFileBuilder::annotation_type("a.Component"),
        ClassFileBuilder::annotation_type("a.Service").annotated(AnnotationSpec::new("a.Component")),
        ClassFileBuilder::class("a.OrderService").annotated(AnnotationSpec::new("a.Service")),
        ClassFileBuilder::class("a.Plain"),
    ]);

    let service = graph.unit_by_name("a.OrderService").unwrap();
    let plain = graph.unit_by_name("a.Plain").unwrap();
    assert!(UnitGraph::is_annotated_with(&service.annotations, "a.Service"));
    assert!(!UnitGraph::is_annotated_with(&service.annotations, "a.Component"));
    assert!(graph.is_meta_annotated_with(&service.annotations, "a.Component"));
    assert!(!graph.is_meta_annotated_with(&plain.annotations, "a.Component"));

    let annotation_edges: Vec<_> = graph
        .dependencies_of(service.id, Direction::Outgoing)
        .filter(|d| d.kind == DependencyKind::Annotation)
        .collect();
    assert_eq!(annotation_edges.len(), 1);
    assert_eq!(
        annotation_edges[0].causes[0].description,
        "Unit <a.OrderService> is annotated with <a.Service>"
    );
}

#[test]
fn test_packages_form_a_tree() {
    let graph = import(vec![
        ClassFileBuilder::class("com.acme.web.Controller"),
        ClassFileBuilder::class("com.acme.domain.Order"),
        ClassFileBuilder::class("Root"),
    ]);

    let root = graph.root_package();
    assert!(root.is_root());
    assert_eq!(root.name, "");
    assert!(root.units.contains(&graph.unit_by_name("Root").unwrap().id));

    let acme = graph.package_by_name("com.acme").unwrap();
    assert_eq!(acme.simple_name, "acme");
    let children: Vec<&str> = acme
        .children
        .iter()
        .map(|id| graph.package(*id).name.as_str())
        .collect();
    assert_eq!(children.len(), 2);
    assert!(children.contains(&"com.acme.web"));
    assert!(children.contains(&"com.acme.domain"));

    let web = graph.package_by_name("com.acme.web").unwrap();
    assert_eq!(web.parent, Some(acme.id));
    assert_eq!(web.units, vec![graph.unit_by_name("com.acme.web.Controller").unwrap().id]);
}

#[test]
fn test_transitive_dependencies() {
    let graph = import(vec![
        ClassFileBuilder::class("a.A").field(FieldSpec::new("b", "a.B")),
        ClassFileBuilder::class("a.B").field(FieldSpec::new("c", "a.C")),
        ClassFileBuilder::class("a.C"),
    ]);
    let id = |n: &str| graph.unit_by_name(n).unwrap().id;
    let mut expected = vec![id("a.B"), id("a.C"), id("java.lang.Object")];
    expected.sort();
    assert_eq!(graph.transitive_dependencies(id("a.A")), expected);
}

// ---- Secondary resolution ----

fn lookup_of(classes: &[ClassFileBuilder]) -> Arc<dyn UnitLookup> {
    let mut lookup = MemoryLookup::new();
    for class in classes {
        let bytes = class.build();
        let name = classfile::read(&bytes).unwrap().name;
        lookup.insert(name, bytes);
    }
    Arc::new(lookup)
}

#[test]
fn test_secondary_lookup_respects_max_depth() {
    let class_path = [
        ClassFileBuilder::class("lib.Baz").field(FieldSpec::new("qux", "lib.Qux")),
        ClassFileBuilder::class("lib.Qux"),
    ];
    let foo = ClassFileBuilder::class("a.Foo").field(FieldSpec::new("baz", "lib.Baz"));

    let shallow = ClassFileImporter::new(secondary(1))
        .with_lookup(lookup_of(&class_path))
        .import_bytes(vec![("memory:Foo".to_string(), foo.build())])
        .unwrap()
        .graph;
    assert!(!shallow.unit_by_name("lib.Baz").unwrap().is_stub());
    assert!(shallow.unit_by_name("lib.Qux").unwrap().is_stub());

    let deep = ClassFileImporter::new(secondary(2))
        .with_lookup(lookup_of(&class_path))
        .import_bytes(vec![("memory:Foo".to_string(), foo.build())])
        .unwrap()
        .graph;
    assert!(!deep.unit_by_name("lib.Qux").unwrap().is_stub());
}

/// Units already being resolved link to themselves instead of being
/// looked up again, so a supertype cycle terminates.
#[test]
fn test_cyclic_supertypes_from_lookup_terminate() {
    let class_path = [
        ClassFileBuilder::class("lib.A").super_class("lib.B"),
        ClassFileBuilder::class("lib.B").super_class("lib.A"),
    ];
    let foo = ClassFileBuilder::class("p.Foo").super_class("lib.A");
    let graph = ClassFileImporter::new(secondary(50))
        .with_lookup(lookup_of(&class_path))
        .import_bytes(vec![("memory:Foo".to_string(), foo.build())])
        .unwrap()
        .graph;

    let a = graph.unit_by_name("lib.A").unwrap();
    let b = graph.unit_by_name("lib.B").unwrap();
    let foo = graph.unit_by_name("p.Foo").unwrap();
    assert!(!a.is_stub());
    assert!(!b.is_stub());
    assert_eq!(a.superclass, Some(b.id));
    assert_eq!(b.superclass, Some(a.id));

    let names = |id| -> Vec<String> {
        graph.supertypes(id).iter().map(|s| graph.unit(*s).name.clone()).collect()
    };
    assert_eq!(names(foo.id), vec!["lib.A", "lib.B"]);
    assert_eq!(names(a.id), vec!["lib.B", "lib.A"]);
    assert!(graph.is_assignable_to(foo.id, b.id));
    assert!(graph.is_assignable_to(a.id, a.id));
    assert!(!graph.is_assignable_to(b.id, foo.id));
    assert!(!graph.is_assignable_to_name(a.id, "java.lang.Object"));
}

#[test]
fn test_lookup_is_skipped_when_secondary_resolution_is_off() {
    let class_path = [ClassFileBuilder::class("lib.Baz")];
    let graph = ClassFileImporter::new(ArchonConfig::default())
        .with_lookup(lookup_of(&class_path))
        .import_bytes(vec![(
            "memory:Foo".to_string(),
            ClassFileBuilder::class("a.Foo").field(FieldSpec::new("baz", "lib.Baz")).build(),
        )])
        .unwrap()
        .graph;
    assert!(graph.unit_by_name("lib.Baz").unwrap().is_stub());
}

#[test]
fn test_always_resolve_patterns_force_lookup() {
    let config = ArchonConfig {
        resolution: ResolutionConfig {
            always_resolve: vec!["lib.*".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let class_path = [ClassFileBuilder::class("lib.Baz"), ClassFileBuilder::class("other.Thing")];
    let graph = ClassFileImporter::new(config)
        .with_lookup(lookup_of(&class_path))
        .import_bytes(vec![(
            "memory:Foo".to_string(),
            ClassFileBuilder::class("a.Foo")
                .field(FieldSpec::new("baz", "lib.Baz"))
                .field(FieldSpec::new("thing", "other.Thing"))
                .build(),
        )])
        .unwrap()
        .graph;
    assert!(!graph.unit_by_name("lib.Baz").unwrap().is_stub());
    assert!(graph.unit_by_name("other.Thing").unwrap().is_stub());
}

struct SleepingLookup;

impl UnitLookup for SleepingLookup {
    fn resolve_by_name(&self, _name: &str) -> Result<Option<Vec<u8>>, LocateError> {
        std::thread::sleep(Duration::from_secs(2));
        Ok(None)
    }
}

/// A slow lookup degrades to a stub with a warning instead of blocking.
#[test]
fn test_lookup_timeout_degrades_to_stub() {
    let mut config = secondary(1);
    config.resolution.lookup_timeout_ms = Some(25);
    let imported = ClassFileImporter::new(config)
        .with_lookup(Arc::new(SleepingLookup))
        .import_bytes(vec![(
            "memory:Foo".to_string(),
            ClassFileBuilder::class("a.Foo").no_super().field(FieldSpec::new("baz", "lib.Baz")).build(),
        )])
        .unwrap();

    assert!(imported.graph.unit_by_name("lib.Baz").unwrap().is_stub());
    assert!(imported.warnings.contains(&ImportWarning::LookupTimedOut {
        name: "lib.Baz".to_string(),
        timeout_ms: 25,
    }));
}

/// Bytes under the wrong name are not trusted.
#[test]
fn test_lookup_returning_another_unit_is_rejected() {
    let lookup = MemoryLookup::new().with_unit("lib.Baz", ClassFileBuilder::class("lib.Other").build());
    let imported = ClassFileImporter::new(secondary(1))
        .with_lookup(Arc::new(lookup))
        .import_bytes(vec![(
            "memory:Foo".to_string(),
            ClassFileBuilder::class("a.Foo").field(FieldSpec::new("baz", "lib.Baz")).build(),
        )])
        .unwrap();
    assert!(imported.graph.unit_by_name("lib.Baz").unwrap().is_stub());
    assert!(imported.graph.unit_by_name("lib.Other").is_none());
    assert!(imported
        .warnings
        .iter()
        .any(|w| matches!(w, ImportWarning::LookupFailed { name, .. } if name == "lib.Baz")));
}

#[derive(Default)]
struct Recorder {
    stubs: Mutex<Vec<String>>,
    lookups: Mutex<Vec<(String, bool)>>,
}

impl ArchonEventHandler for Recorder {
    fn on_stub_created(&self, event: &StubCreatedEvent) {
        self.stubs.lock().unwrap().push(event.name.clone());
    }

    fn on_secondary_lookup(&self, event: &SecondaryLookupEvent) {
        self.lookups.lock().unwrap().push((event.name.clone(), event.found));
    }
}

#[test]
fn test_resolution_emits_stub_and_lookup_events() {
    let recorder = Arc::new(Recorder::default());
    let mut events = EventDispatcher::new();
    events.register(recorder.clone());

    let lookup = MemoryLookup::new().with_unit("lib.Baz", ClassFileBuilder::class("lib.Baz").no_super().build());
    ClassFileImporter::new(secondary(1))
        .with_lookup(Arc::new(lookup))
        .with_events(events)
        .import_bytes(vec![(
            "memory:Foo".to_string(),
            ClassFileBuilder::class("a.Foo")
                .no_super()
                .field(FieldSpec::new("baz", "lib.Baz"))
                .field(FieldSpec::new("gone", "lib.Gone"))
                .build(),
        )])
        .unwrap();

    assert_eq!(*recorder.stubs.lock().unwrap(), vec!["lib.Gone".to_string()]);
    let mut lookups = recorder.lookups.lock().unwrap().clone();
    lookups.sort();
    assert_eq!(
        lookups,
        vec![("lib.Baz".to_string(), true), ("lib.Gone".to_string(), false)]
    );
}

// ---- Import modes ----

#[test]
fn test_lenient_import_skips_malformed_units() {
    let imported = ClassFileImporter::new(ArchonConfig::default())
        .import_bytes(vec![
            ("memory:Foo".to_string(), ClassFileBuilder::class("a.Foo").build()),
            ("memory:broken".to_string(), vec![0xCA, 0xFE]),
        ])
        .unwrap();

    assert!(imported.graph.unit_by_name("a.Foo").is_some());
    assert!(matches!(
        &imported.warnings[..],
        [ImportWarning::SkippedUnit { origin, .. }] if origin == "memory:broken"
    ));
}

/// An unreadable archive is skipped under its own path, not its message.
#[test]
fn test_lenient_import_names_unreadable_archives() {
    let dir = tempfile::TempDir::new().unwrap();
    let broken = dir.path().join("broken.jar");
    std::fs::write(&broken, b"definitely not a zip").unwrap();

    let imported = ClassFileImporter::new(ArchonConfig::default())
        .import(&[
            UnitSource::Archive(broken.clone()),
            UnitSource::memory("memory:Foo", ClassFileBuilder::class("a.Foo").build()),
        ])
        .unwrap();

    assert!(imported.graph.unit_by_name("a.Foo").is_some());
    match &imported.warnings[..] {
        [ImportWarning::SkippedUnit { origin, reason }] => {
            assert_eq!(origin, &broken.display().to_string());
            assert!(reason.starts_with("Archive error in "));
            assert_ne!(origin, reason);
        }
        other => panic!("expected one skipped archive, got {other:?}"),
    }
}

#[test]
fn test_strict_import_fails_on_malformed_units() {
    let config = ArchonConfig {
        import: ImportConfig {
            strict: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };
    let err = ClassFileImporter::new(config)
        .import_bytes(vec![
            ("memory:Foo".to_string(), ClassFileBuilder::class("a.Foo").build()),
            ("memory:broken".to_string(), vec![0xCA, 0xFE]),
        ])
        .unwrap_err();
    assert!(matches!(err, ImportError::Malformed { ref origin, .. } if origin == "memory:broken"));
}

#[test]
fn test_duplicate_units_warn_and_keep_the_later_one() {
    let imported = ClassFileImporter::new(ArchonConfig::default())
        .import_bytes(vec![
            (
                "first".to_string(),
                ClassFileBuilder::class("a.Foo").source_file(Some("First.java")).build(),
            ),
            (
                "second".to_string(),
                ClassFileBuilder::class("a.Foo").source_file(Some("Second.java")).build(),
            ),
        ])
        .unwrap();

    let foo = imported.graph.unit_by_name("a.Foo").unwrap();
    assert_eq!(foo.source_file.as_deref(), Some("Second.java"));
    assert_eq!(
        imported.warnings,
        vec![ImportWarning::DuplicateUnit {
            name: "a.Foo".to_string(),
            kept_origin: "second".to_string(),
            dropped_origin: "first".to_string(),
        }]
    );
}

#[test]
fn test_explicit_thread_count_is_honored() {
    let config = ArchonConfig {
        import: ImportConfig {
            threads: Some(2),
            ..Default::default()
        },
        ..Default::default()
    };
    let classes: Vec<ClassFileBuilder> = (0..16)
        .map(|i| ClassFileBuilder::class(&format!("p.C{i}")))
        .collect();
    let imported = import_with(config, classes);
    assert_eq!(imported.graph.units().iter().filter(|u| !u.is_stub()).count(), 16);
}

#[test]
fn test_resolver_runs_without_importer() {
    let raw = vec![
        classfile::read(&ClassFileBuilder::class("a.Foo").field(FieldSpec::new("b", "a.Bar")).build()).unwrap(),
        classfile::read(&ClassFileBuilder::class("a.Bar").build()).unwrap(),
    ];
    let resolution = GraphResolver::new(ResolverOptions::default()).resolve(raw).unwrap();
    assert!(resolution.warnings.is_empty());
    assert_eq!(targets(&resolution.graph, "a.Foo"), vec!["a.Bar"]);
}

// ---- Structural properties ----

/// `(referenced unit indices, external call targets)` per generated unit.
fn arb_units() -> impl Strategy<Value = Vec<(Vec<usize>, Vec<u8>)>> {
    prop::collection::vec(
        (prop::collection::vec(0usize..6, 0..4), prop::collection::vec(0u8..3, 0..2)),
        1..6,
    )
}

fn build_units(shape: &[(Vec<usize>, Vec<u8>)]) -> Vec<(String, Vec<u8>)> {
    let count = shape.len();
    shape.iter()
        .enumerate()
        .map(|(i, (refs, external))| {
            let mut class = ClassFileBuilder::class(&format!("p{}.C{i}", i % 2));
            for (n, r) in refs.iter().enumerate() {
                let target = r % count;
                class = class.field(FieldSpec::new(&format!("f{n}"), &format!("p{}.C{target}", target % 2)));
            }
            for (n, e) in external.iter().enumerate() {
                class = class.method(
                    MethodSpec::new(&format!("m{n}"), "()V").calls(&format!("ext.E{e}"), "go", "()V", 3),
                );
            }
            (format!("memory:{i}"), class.build())
        })
        .collect()
}

proptest! {
    /// Every dependency is registered on both of its ends, and nowhere else.
    #[test]
    fn test_dependency_edges_are_symmetric(shape in arb_units()) {
        let graph = ClassFileImporter::new(ArchonConfig::default())
            .import_bytes(build_units(&shape))
            .unwrap()
            .graph;
        for dependency in graph.dependencies() {
            prop_assert!(graph.unit(dependency.origin).outgoing_dependencies().contains(&dependency.id));
            prop_assert!(graph.unit(dependency.target).incoming_dependencies().contains(&dependency.id));
            prop_assert!(!dependency.causes.is_empty());
            prop_assert_ne!(dependency.origin, dependency.target);
        }
        let outgoing: usize = graph.units().iter().map(|u| u.outgoing_dependencies().len()).sum();
        let incoming: usize = graph.units().iter().map(|u| u.incoming_dependencies().len()).sum();
        prop_assert_eq!(outgoing, graph.dependencies().len());
        prop_assert_eq!(incoming, graph.dependencies().len());
        for stub in graph.stubs() {
            prop_assert!(stub.outgoing_dependencies().is_empty());
        }
    }

    /// Re-importing the same units, in any order, yields the same graph.
    #[test]
    fn test_resolution_is_order_independent(shape in arb_units()) {
        let units = build_units(&shape);
        let mut reversed = units.clone();
        reversed.reverse();
        let importer = ClassFileImporter::new(ArchonConfig::default());
        let first = importer.import_bytes(units.clone()).unwrap().graph;
        let again = importer.import_bytes(units).unwrap().graph;
        let backwards = importer.import_bytes(reversed).unwrap().graph;
        prop_assert_eq!(first.fingerprint(), again.fingerprint());
        prop_assert_eq!(first.fingerprint(), backwards.fingerprint());
        let names = |g: &UnitGraph| g.units().iter().map(|u| u.name.clone()).collect::<Vec<_>>();
        prop_assert_eq!(names(&first), names(&backwards));
        prop_assert_eq!(first.dependencies().len(), backwards.dependencies().len());
    }
}
