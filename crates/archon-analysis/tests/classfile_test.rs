//! Tests for the class-file reader against fixture-built class files.

use archon_analysis::classfile::{self, RawAnnotationValue};
use archon_analysis::domain::{AccessKind, MemberKind, TypeReferenceKind, UnitKind};
use archon_core::errors::MalformedUnitError;
use archon_fixtures::{
    access, method_descriptor, AnnotationSpec, ClassFileBuilder, FieldSpec, MethodSpec, ValueSpec,
};

#[test]
fn test_reads_names_and_hierarchy() {
    let bytes = ClassFileBuilder::class("com.acme.service.OrderService")
        .super_class("com.acme.service.BaseService")
        .implements("com.acme.api.Service")
        .implements("java.io.Serializable")
        .build();

    let unit = classfile::read(&bytes).unwrap();
    assert_eq!(unit.name, "com.acme.service.OrderService");
    assert_eq!(unit.kind, UnitKind::Class);
    assert_eq!(unit.superclass.as_deref(), Some("com.acme.service.BaseService"));
    assert_eq!(unit.interfaces, vec!["com.acme.api.Service", "java.io.Serializable"]);
    assert_eq!(unit.source_file.as_deref(), Some("OrderService.java"));
    assert_eq!(unit.major_version, 61);
    assert!(unit.modifiers.is_public());
}

#[test]
fn test_reads_unit_kinds() {
    let interface = classfile::read(&ClassFileBuilder::interface("a.Port").build()).unwrap();
    let annotation = classfile::read(&ClassFileBuilder::annotation_type("a.Marker").build()).unwrap();
    let enumeration = classfile::read(&ClassFileBuilder::enum_type("a.Color").build()).unwrap();

    assert_eq!(interface.kind, UnitKind::Interface);
    assert_eq!(annotation.kind, UnitKind::Annotation);
    assert_eq!(enumeration.kind, UnitKind::Enum);
    assert_eq!(enumeration.superclass.as_deref(), Some("java.lang.Enum"));
}

/// Only `java.lang.Object` has no superclass.
#[test]
fn test_object_has_no_superclass() {
    let bytes = ClassFileBuilder::class("java.lang.Object").no_super().build();
    let unit = classfile::read(&bytes).unwrap();
    assert_eq!(unit.superclass, None);
}

#[test]
fn test_reads_members_with_types() {
    let bytes = ClassFileBuilder::class("a.Foo")
        .field(FieldSpec::new("count", "int"))
        .field(FieldSpec::new("names", "java.lang.String[]").access(access::PUBLIC | access::FINAL))
        .method(MethodSpec::constructor(&method_descriptor(&["a.Bar"], "void")))
        .method(
            MethodSpec::new("find", &method_descriptor(&["long", "java.lang.String"], "a.Bar"))
                .throws("java.io.IOException"),
        )
        .build();

    let unit = classfile::read(&bytes).unwrap();
    let member = |name: &str| unit.members.iter().find(|m| m.name == name).unwrap();

    let count = member("count");
    assert_eq!(count.kind, MemberKind::Field);
    assert_eq!(count.return_type, "int");
    assert!(count.parameter_types.is_empty());

    let names = member("names");
    assert_eq!(names.return_type, "java.lang.String[]");
    assert!(names.modifiers.is_public());
    assert!(names.modifiers.is_final());

    let constructor = member("<init>");
    assert_eq!(constructor.kind, MemberKind::Constructor);
    assert_eq!(constructor.parameter_types, vec!["a.Bar"]);

    let find = member("find");
    assert_eq!(find.kind, MemberKind::Method);
    assert_eq!(find.parameter_types, vec!["long", "java.lang.String"]);
    assert_eq!(find.return_type, "a.Bar");
    assert_eq!(find.throws, vec!["java.io.IOException"]);
    assert_eq!(find.descriptor, "(JLjava/lang/String;)La/Bar;");
}

#[test]
fn test_reads_annotations_on_units_members_and_parameters() {
    let bytes = ClassFileBuilder::class("a.Foo")
        .annotated(
            AnnotationSpec::new("a.Component")
                .with("value", ValueSpec::Str("foo".to_string()))
                .with("order", ValueSpec::Int(3)),
        )
        .annotated_invisible(AnnotationSpec::new("a.Generated"))
        .field(FieldSpec::new("repo", "a.Repo").annotated(AnnotationSpec::new("a.Inject")))
        .method(
            MethodSpec::new("handle", &method_descriptor(&["java.lang.String"], "void"))
                .parameter_annotations(vec![vec![AnnotationSpec::new("a.NotNull")]]),
        )
        .build();

    let unit = classfile::read(&bytes).unwrap();
    let names: Vec<&str> = unit.annotations.iter().map(|a| a.type_name.as_str()).collect();
    assert_eq!(names, vec!["a.Component", "a.Generated"]);

    let component = &unit.annotations[0];
    assert_eq!(
        component.values,
        vec![
            ("value".to_string(), RawAnnotationValue::String("foo".to_string())),
            ("order".to_string(), RawAnnotationValue::Int(3)),
        ]
    );

    let repo = unit.members.iter().find(|m| m.name == "repo").unwrap();
    assert_eq!(repo.annotations[0].type_name, "a.Inject");

    let handle = unit.members.iter().find(|m| m.name == "handle").unwrap();
    assert_eq!(handle.parameter_annotations.len(), 1);
    assert_eq!(handle.parameter_annotations[0][0].type_name, "a.NotNull");
}

#[test]
fn test_reads_annotation_defaults() {
    let bytes = ClassFileBuilder::annotation_type("a.Retry")
        .method(
            MethodSpec::abstract_method("times", &method_descriptor(&[], "int"))
                .default_value(ValueSpec::Int(3)),
        )
        .build();

    let unit = classfile::read(&bytes).unwrap();
    let times = &unit.members[0];
    assert_eq!(times.annotation_default, Some(RawAnnotationValue::Int(3)));
}

#[test]
fn test_reads_accesses_with_line_numbers() {
    let bytes = ClassFileBuilder::class("a.Foo")
        .method(
            MethodSpec::new("run", &method_descriptor(&[], "void"))
                .calls("b.Bar", "work", &method_descriptor(&["int"], "void"), 12)
                .calls_static("b.Util", "help", &method_descriptor(&[], "void"), 13)
                .gets_field("b.Bar", "state", "int", 14)
                .sets_static("b.Config", "level", "int", 15)
                .constructs("b.Baz", &method_descriptor(&[], "void"), 16),
        )
        .build();

    let unit = classfile::read(&bytes).unwrap();
    let run = unit.members.iter().find(|m| m.name == "run").unwrap();
    let observed: Vec<(AccessKind, &str, &str, u32)> = run
        .accesses
        .iter()
        .map(|a| (a.kind, a.owner.as_str(), a.name.as_str(), a.line))
        .collect();
    assert_eq!(
        observed,
        vec![
            (AccessKind::CallMethod, "b.Bar", "work", 12),
            (AccessKind::CallMethod, "b.Util", "help", 13),
            (AccessKind::GetField, "b.Bar", "state", 14),
            (AccessKind::SetField, "b.Config", "level", 15),
            (AccessKind::CallConstructor, "b.Baz", "<init>", 16),
        ]
    );
    assert_eq!(run.line, 12);
}

/// Member line is the smallest line in the body, not the first entry.
#[test]
fn test_member_line_is_smallest_line() {
    let bytes = ClassFileBuilder::class("a.Foo")
        .method(
            MethodSpec::new("run", &method_descriptor(&[], "void"))
                .calls("b.Bar", "late", &method_descriptor(&[], "void"), 30)
                .calls("b.Bar", "early", &method_descriptor(&[], "void"), 21),
        )
        .build();

    let unit = classfile::read(&bytes).unwrap();
    assert_eq!(unit.members[0].line, 21);
}

#[test]
fn test_same_unit_accesses_are_not_recorded() {
    let bytes = ClassFileBuilder::class("a.Foo")
        .method(
            MethodSpec::new("run", &method_descriptor(&[], "void"))
                .calls("a.Foo", "helper", &method_descriptor(&[], "void"), 5)
                .calls("b.Bar", "work", &method_descriptor(&[], "void"), 6),
        )
        .build();

    let unit = classfile::read(&bytes).unwrap();
    let owners: Vec<&str> = unit.members[0].accesses.iter().map(|a| a.owner.as_str()).collect();
    assert_eq!(owners, vec!["b.Bar"]);
}

#[test]
fn test_reads_type_references() {
    let bytes = ClassFileBuilder::class("a.Foo")
        .method(
            MethodSpec::new("check", &method_descriptor(&["java.lang.Object"], "boolean"))
                .instance_of("b.Shape", 7)
                .padding(3)
                .class_literal("b.Circle", 8),
        )
        .build();

    let unit = classfile::read(&bytes).unwrap();
    let references: Vec<(TypeReferenceKind, &str, u32)> = unit.members[0]
        .type_references
        .iter()
        .map(|r| (r.kind, r.type_name.as_str(), r.line))
        .collect();
    assert_eq!(
        references,
        vec![
            (TypeReferenceKind::InstanceOf, "b.Shape", 7),
            (TypeReferenceKind::ClassLiteral, "b.Circle", 8),
        ]
    );
}

/// Nested units take their source-level modifiers from `InnerClasses`.
#[test]
fn test_reads_nesting_attributes() {
    let bytes = ClassFileBuilder::class("a.Outer$Inner")
        .access(access::SUPER)
        .inner_class("a.Outer$Inner", Some("a.Outer"), Some("Inner"), access::PRIVATE | access::STATIC)
        .build();

    let unit = classfile::read(&bytes).unwrap();
    let own = unit.own_nesting().unwrap();
    assert_eq!(own.outer.as_deref(), Some("a.Outer"));
    assert_eq!(own.simple_name.as_deref(), Some("Inner"));
    assert!(unit.modifiers.is_static());
    assert!(!unit.modifiers.is_public());
    assert_eq!(unit.source_file.as_deref(), Some("Outer.java"));
}

#[test]
fn test_reads_enclosing_method() {
    let bytes = ClassFileBuilder::class("a.Outer$1")
        .enclosing_method("a.Outer", Some(("run", "()V")))
        .inner_class("a.Outer$1", None, None, 0)
        .build();

    let unit = classfile::read(&bytes).unwrap();
    let enclosing = unit.enclosing_method.unwrap();
    assert_eq!(enclosing.unit, "a.Outer");
    assert_eq!(enclosing.method, Some(("run".to_string(), "()V".to_string())));
}

#[test]
fn test_rejects_bad_magic() {
    let mut bytes = ClassFileBuilder::class("a.Foo").build();
    bytes[..4].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(
        classfile::read(&bytes).unwrap_err(),
        MalformedUnitError::BadMagic { found: 0xDEAD_BEEF }
    );
}

#[test]
fn test_rejects_unsupported_version() {
    let bytes = ClassFileBuilder::class("a.Foo").version(70, 0).build();
    assert_eq!(
        classfile::read(&bytes).unwrap_err(),
        MalformedUnitError::UnsupportedVersion { major: 70, minor: 0 }
    );
}

#[test]
fn test_accepts_oldest_and_newest_versions() {
    for major in [classfile::MIN_MAJOR_VERSION, classfile::MAX_MAJOR_VERSION] {
        let bytes = ClassFileBuilder::class("a.Foo").version(major, 0).build();
        assert_eq!(classfile::read(&bytes).unwrap().major_version, major);
    }
}

/// Every strict prefix of a valid class file is rejected, never panics.
#[test]
fn test_rejects_truncated_input() {
    let bytes = ClassFileBuilder::class("a.Foo")
        .field(FieldSpec::new("x", "int"))
        .method(MethodSpec::new("run", "()V").calls("b.Bar", "go", "()V", 3))
        .build();

    for len in 0..bytes.len() {
        let err = classfile::read(&bytes[..len]).unwrap_err();
        assert!(
            matches!(
                err,
                MalformedUnitError::Truncated { .. } | MalformedUnitError::MalformedAttribute { .. }
            ),
            "prefix of {len} bytes gave {err:?}"
        );
    }
}

#[test]
fn test_truncated_header_reports_offset() {
    let bytes = ClassFileBuilder::class("a.Foo").build();
    assert_eq!(
        classfile::read(&bytes[..9]).unwrap_err(),
        MalformedUnitError::Truncated { offset: 8, needed: 1 }
    );
}
