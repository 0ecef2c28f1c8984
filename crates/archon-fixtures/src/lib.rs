//! Class-file and archive builders for Archon tests.
//!
//! Tests across the workspace need real class-file bytes without a Java
//! toolchain. [`ClassFileBuilder`] assembles minimal but well-formed class
//! files (constant pool, members, `Code` with `LineNumberTable`, annotations,
//! nesting attributes), and the archive helpers lay them out as directory
//! trees or jars.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

/// Access flag constants shared by classes, fields, and methods.
pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SUPER: u16 = 0x0020;
    pub const SYNCHRONIZED: u16 = 0x0020;
    pub const VOLATILE: u16 = 0x0040;
    pub const TRANSIENT: u16 = 0x0080;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;
}

mod opcode {
    pub const LDC_W: u8 = 0x13;
    pub const RETURN: u8 = 0xb1;
    pub const GETSTATIC: u8 = 0xb2;
    pub const PUTSTATIC: u8 = 0xb3;
    pub const GETFIELD: u8 = 0xb4;
    pub const PUTFIELD: u8 = 0xb5;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
    pub const INVOKESPECIAL: u8 = 0xb7;
    pub const INVOKESTATIC: u8 = 0xb8;
    pub const INVOKEINTERFACE: u8 = 0xb9;
    pub const NEW: u8 = 0xbb;
    pub const INSTANCEOF: u8 = 0xc1;
    pub const NOP: u8 = 0x00;
}

/// Convert a dotted type name (`int`, `com.a.Foo`, `com.a.Foo[]`) to a
/// field descriptor.
pub fn descriptor_of(type_name: &str) -> String {
    if let Some(component) = type_name.strip_suffix("[]") {
        return format!("[{}", descriptor_of(component));
    }
    match type_name {
        "byte" => "B".into(),
        "char" => "C".into(),
        "double" => "D".into(),
        "float" => "F".into(),
        "int" => "I".into(),
        "long" => "J".into(),
        "short" => "S".into(),
        "boolean" => "Z".into(),
        "void" => "V".into(),
        other => format!("L{};", other.replace('.', "/")),
    }
}

/// Build a method descriptor from dotted parameter and return type names.
pub fn method_descriptor(parameters: &[&str], return_type: &str) -> String {
    let params: String = parameters.iter().map(|p| descriptor_of(p)).collect();
    format!("({}){}", params, descriptor_of(return_type))
}

/// Entry name of a class inside an archive or directory tree.
pub fn class_entry_name(name: &str) -> String {
    format!("{}.class", name.replace('.', "/"))
}

/// Value of an annotation element.
#[derive(Debug, Clone)]
pub enum ValueSpec {
    Byte(i8),
    Char(char),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Bool(bool),
    Str(String),
    Enum { type_name: String, constant: String },
    Class(String),
    Annotation(AnnotationSpec),
    Array(Vec<ValueSpec>),
}

/// An annotation to attach to a class, member, or parameter.
#[derive(Debug, Clone)]
pub struct AnnotationSpec {
    pub type_name: String,
    pub values: Vec<(String, ValueSpec)>,
}

impl AnnotationSpec {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            values: Vec::new(),
        }
    }

    pub fn with(mut self, name: &str, value: ValueSpec) -> Self {
        self.values.push((name.to_string(), value));
        self
    }
}

/// One `InnerClasses` entry.
#[derive(Debug, Clone)]
pub struct InnerClassSpec {
    pub inner: String,
    pub outer: Option<String>,
    pub simple_name: Option<String>,
    pub access: u16,
}

#[derive(Debug, Clone)]
enum Instruction {
    Invoke {
        op: u8,
        owner: String,
        name: String,
        descriptor: String,
        line: u16,
    },
    Field {
        op: u8,
        owner: String,
        name: String,
        descriptor: String,
        line: u16,
    },
    TypeOp {
        op: u8,
        type_name: String,
        line: u16,
    },
    ClassLiteral {
        type_name: String,
        line: u16,
    },
    Padding {
        bytes: usize,
    },
}

/// A field declaration.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    descriptor: String,
    access: u16,
    annotations: Vec<AnnotationSpec>,
}

impl FieldSpec {
    /// A private field of the given dotted type.
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            descriptor: descriptor_of(type_name),
            access: access::PRIVATE,
            annotations: Vec::new(),
        }
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access = flags;
        self
    }

    pub fn annotated(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A method or constructor declaration, optionally with a body.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    descriptor: String,
    access: u16,
    throws: Vec<String>,
    annotations: Vec<AnnotationSpec>,
    parameter_annotations: Vec<Vec<AnnotationSpec>>,
    default_value: Option<ValueSpec>,
    instructions: Vec<Instruction>,
    has_code: bool,
}

impl MethodSpec {
    /// A public method with a body.
    pub fn new(name: &str, descriptor: &str) -> Self {
        Self {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access: access::PUBLIC,
            throws: Vec::new(),
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            default_value: None,
            instructions: Vec::new(),
            has_code: true,
        }
    }

    /// A public constructor with a body.
    pub fn constructor(descriptor: &str) -> Self {
        Self::new("<init>", descriptor)
    }

    /// A public abstract method without a body (interface or annotation
    /// element).
    pub fn abstract_method(name: &str, descriptor: &str) -> Self {
        let mut spec = Self::new(name, descriptor);
        spec.access = access::PUBLIC | access::ABSTRACT;
        spec.has_code = false;
        spec
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access = flags;
        if flags & access::ABSTRACT != 0 || flags & access::NATIVE != 0 {
            self.has_code = false;
        }
        self
    }

    pub fn throws(mut self, type_name: &str) -> Self {
        self.throws.push(type_name.to_string());
        self
    }

    pub fn annotated(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn parameter_annotations(mut self, per_parameter: Vec<Vec<AnnotationSpec>>) -> Self {
        self.parameter_annotations = per_parameter;
        self
    }

    pub fn default_value(mut self, value: ValueSpec) -> Self {
        self.default_value = Some(value);
        self
    }

    /// `invokevirtual owner.name descriptor` at `line`.
    pub fn calls(self, owner: &str, name: &str, descriptor: &str, line: u16) -> Self {
        self.invoke(opcode::INVOKEVIRTUAL, owner, name, descriptor, line)
    }

    /// `invokestatic owner.name descriptor` at `line`.
    pub fn calls_static(self, owner: &str, name: &str, descriptor: &str, line: u16) -> Self {
        self.invoke(opcode::INVOKESTATIC, owner, name, descriptor, line)
    }

    /// `invokeinterface owner.name descriptor` at `line`.
    pub fn calls_interface(self, owner: &str, name: &str, descriptor: &str, line: u16) -> Self {
        self.invoke(opcode::INVOKEINTERFACE, owner, name, descriptor, line)
    }

    /// `new owner` followed by `invokespecial owner.<init>` at `line`.
    pub fn constructs(mut self, owner: &str, descriptor: &str, line: u16) -> Self {
        self.has_code = true;
        self.instructions.push(Instruction::TypeOp {
            op: opcode::NEW,
            type_name: owner.to_string(),
            line,
        });
        self.invoke(opcode::INVOKESPECIAL, owner, "<init>", descriptor, line)
    }

    /// `getfield owner.name` at `line`.
    pub fn gets_field(self, owner: &str, name: &str, type_name: &str, line: u16) -> Self {
        self.field_op(opcode::GETFIELD, owner, name, type_name, line)
    }

    /// `putfield owner.name` at `line`.
    pub fn sets_field(self, owner: &str, name: &str, type_name: &str, line: u16) -> Self {
        self.field_op(opcode::PUTFIELD, owner, name, type_name, line)
    }

    /// `getstatic owner.name` at `line`.
    pub fn gets_static(self, owner: &str, name: &str, type_name: &str, line: u16) -> Self {
        self.field_op(opcode::GETSTATIC, owner, name, type_name, line)
    }

    /// `putstatic owner.name` at `line`.
    pub fn sets_static(self, owner: &str, name: &str, type_name: &str, line: u16) -> Self {
        self.field_op(opcode::PUTSTATIC, owner, name, type_name, line)
    }

    /// `instanceof type_name` at `line`.
    pub fn instance_of(mut self, type_name: &str, line: u16) -> Self {
        self.instructions.push(Instruction::TypeOp {
            op: opcode::INSTANCEOF,
            type_name: type_name.to_string(),
            line,
        });
        self
    }

    /// `ldc_w Class` (a class literal) at `line`.
    pub fn class_literal(mut self, type_name: &str, line: u16) -> Self {
        self.instructions.push(Instruction::ClassLiteral {
            type_name: type_name.to_string(),
            line,
        });
        self
    }

    /// Insert `nop` padding so later instructions land at unaligned offsets.
    pub fn padding(mut self, bytes: usize) -> Self {
        self.instructions.push(Instruction::Padding { bytes });
        self
    }

    fn invoke(mut self, op: u8, owner: &str, name: &str, descriptor: &str, line: u16) -> Self {
        self.has_code = true;
        self.instructions.push(Instruction::Invoke {
            op,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            line,
        });
        self
    }

    fn field_op(mut self, op: u8, owner: &str, name: &str, type_name: &str, line: u16) -> Self {
        self.has_code = true;
        self.instructions.push(Instruction::Field {
            op,
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor_of(type_name),
            line,
        });
        self
    }
}

/// Builder for one class file.
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    name: String,
    access: u16,
    super_name: Option<String>,
    interfaces: Vec<String>,
    source_file: Option<String>,
    major: u16,
    minor: u16,
    fields: Vec<FieldSpec>,
    methods: Vec<MethodSpec>,
    annotations: Vec<AnnotationSpec>,
    invisible_annotations: Vec<AnnotationSpec>,
    inner_classes: Vec<InnerClassSpec>,
    enclosing_method: Option<(String, Option<(String, String)>)>,
}

impl ClassFileBuilder {
    /// A public class extending `java.lang.Object`, compiled for Java 17.
    pub fn class(name: &str) -> Self {
        let top_level = name.rsplit('.').next().unwrap_or(name);
        let top_level = top_level.split('$').next().unwrap_or(top_level);
        Self {
            name: name.to_string(),
            access: access::PUBLIC | access::SUPER,
            super_name: Some("java.lang.Object".to_string()),
            interfaces: Vec::new(),
            source_file: Some(format!("{top_level}.java")),
            major: 61,
            minor: 0,
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
            invisible_annotations: Vec::new(),
            inner_classes: Vec::new(),
            enclosing_method: None,
        }
    }

    /// A public interface.
    pub fn interface(name: &str) -> Self {
        Self::class(name).access(access::PUBLIC | access::INTERFACE | access::ABSTRACT)
    }

    /// A public annotation type.
    pub fn annotation_type(name: &str) -> Self {
        Self::class(name)
            .access(access::PUBLIC | access::INTERFACE | access::ABSTRACT | access::ANNOTATION)
            .implements("java.lang.annotation.Annotation")
    }

    /// A public final enum.
    pub fn enum_type(name: &str) -> Self {
        Self::class(name)
            .access(access::PUBLIC | access::FINAL | access::SUPER | access::ENUM)
            .super_class("java.lang.Enum")
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access = flags;
        self
    }

    pub fn super_class(mut self, name: &str) -> Self {
        self.super_name = Some(name.to_string());
        self
    }

    /// Drop the superclass, as only `java.lang.Object` does.
    pub fn no_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn implements(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    pub fn source_file(mut self, file: Option<&str>) -> Self {
        self.source_file = file.map(str::to_string);
        self
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    pub fn annotated(mut self, annotation: AnnotationSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Attach a class-retention (invisible) annotation.
    pub fn annotated_invisible(mut self, annotation: AnnotationSpec) -> Self {
        self.invisible_annotations.push(annotation);
        self
    }

    pub fn inner_class(
        mut self,
        inner: &str,
        outer: Option<&str>,
        simple_name: Option<&str>,
        flags: u16,
    ) -> Self {
        self.inner_classes.push(InnerClassSpec {
            inner: inner.to_string(),
            outer: outer.map(str::to_string),
            simple_name: simple_name.map(str::to_string),
            access: flags,
        });
        self
    }

    pub fn enclosing_method(mut self, class: &str, method: Option<(&str, &str)>) -> Self {
        self.enclosing_method = Some((
            class.to_string(),
            method.map(|(n, d)| (n.to_string(), d.to_string())),
        ));
        self
    }

    /// Assemble the class file.
    pub fn build(&self) -> Vec<u8> {
        let mut pool = ConstantPool::default();
        let mut body = Sink::default();

        let this_index = pool.class(&self.name);
        let super_index = self.super_name.as_deref().map(|s| pool.class(s)).unwrap_or(0);

        body.u16(self.access);
        body.u16(this_index);
        body.u16(super_index);
        body.u16(self.interfaces.len() as u16);
        for interface in &self.interfaces {
            let index = pool.class(interface);
            body.u16(index);
        }

        body.u16(self.fields.len() as u16);
        for field in &self.fields {
            body.u16(field.access);
            body.u16(pool.utf8(&field.name));
            body.u16(pool.utf8(&field.descriptor));
            let mut attributes = Vec::new();
            if !field.annotations.is_empty() {
                attributes.push(annotations_attribute(
                    &mut pool,
                    "RuntimeVisibleAnnotations",
                    &field.annotations,
                ));
            }
            write_attributes(&mut body, &attributes);
        }

        body.u16(self.methods.len() as u16);
        for method in &self.methods {
            body.u16(method.access);
            body.u16(pool.utf8(&method.name));
            body.u16(pool.utf8(&method.descriptor));
            let mut attributes = Vec::new();
            if method.has_code {
                attributes.push(code_attribute(&mut pool, method));
            }
            if !method.throws.is_empty() {
                let name = pool.utf8("Exceptions");
                let mut data = Sink::default();
                data.u16(method.throws.len() as u16);
                for thrown in &method.throws {
                    data.u16(pool.class(thrown));
                }
                attributes.push((name, data.into_inner()));
            }
            if !method.annotations.is_empty() {
                attributes.push(annotations_attribute(
                    &mut pool,
                    "RuntimeVisibleAnnotations",
                    &method.annotations,
                ));
            }
            if !method.parameter_annotations.is_empty() {
                let name = pool.utf8("RuntimeVisibleParameterAnnotations");
                let mut data = Sink::default();
                data.u8(method.parameter_annotations.len() as u8);
                for annotations in &method.parameter_annotations {
                    data.u16(annotations.len() as u16);
                    for annotation in annotations {
                        write_annotation(&mut pool, &mut data, annotation);
                    }
                }
                attributes.push((name, data.into_inner()));
            }
            if let Some(ref value) = method.default_value {
                let name = pool.utf8("AnnotationDefault");
                let mut data = Sink::default();
                write_element_value(&mut pool, &mut data, value);
                attributes.push((name, data.into_inner()));
            }
            write_attributes(&mut body, &attributes);
        }

        let mut attributes = Vec::new();
        if let Some(ref file) = self.source_file {
            let name = pool.utf8("SourceFile");
            let mut data = Sink::default();
            data.u16(pool.utf8(file));
            attributes.push((name, data.into_inner()));
        }
        if !self.annotations.is_empty() {
            attributes.push(annotations_attribute(
                &mut pool,
                "RuntimeVisibleAnnotations",
                &self.annotations,
            ));
        }
        if !self.invisible_annotations.is_empty() {
            attributes.push(annotations_attribute(
                &mut pool,
                "RuntimeInvisibleAnnotations",
                &self.invisible_annotations,
            ));
        }
        if !self.inner_classes.is_empty() {
            let name = pool.utf8("InnerClasses");
            let mut data = Sink::default();
            data.u16(self.inner_classes.len() as u16);
            for entry in &self.inner_classes {
                data.u16(pool.class(&entry.inner));
                let outer = entry.outer.as_deref().map(|o| pool.class(o)).unwrap_or(0);
                data.u16(outer);
                let simple = entry.simple_name.as_deref().map(|s| pool.utf8(s)).unwrap_or(0);
                data.u16(simple);
                data.u16(entry.access);
            }
            attributes.push((name, data.into_inner()));
        }
        if let Some((ref class, ref method)) = self.enclosing_method {
            let name = pool.utf8("EnclosingMethod");
            let mut data = Sink::default();
            data.u16(pool.class(class));
            let method_index = method
                .as_ref()
                .map(|(n, d)| pool.name_and_type(n, d))
                .unwrap_or(0);
            data.u16(method_index);
            attributes.push((name, data.into_inner()));
        }
        write_attributes(&mut body, &attributes);

        let mut out = Sink::default();
        out.u32(0xCAFE_BABE);
        out.u16(self.minor);
        out.u16(self.major);
        pool.write(&mut out);
        out.bytes(&body.into_inner());
        out.into_inner()
    }
}

fn write_attributes(body: &mut Sink, attributes: &[(u16, Vec<u8>)]) {
    body.u16(attributes.len() as u16);
    for (name, data) in attributes {
        body.u16(*name);
        body.u32(data.len() as u32);
        body.bytes(data);
    }
}

fn annotations_attribute(
    pool: &mut ConstantPool,
    attribute: &str,
    annotations: &[AnnotationSpec],
) -> (u16, Vec<u8>) {
    let name = pool.utf8(attribute);
    let mut data = Sink::default();
    data.u16(annotations.len() as u16);
    for annotation in annotations {
        write_annotation(pool, &mut data, annotation);
    }
    (name, data.into_inner())
}

fn write_annotation(pool: &mut ConstantPool, data: &mut Sink, annotation: &AnnotationSpec) {
    data.u16(pool.utf8(&descriptor_of(&annotation.type_name)));
    data.u16(annotation.values.len() as u16);
    for (name, value) in &annotation.values {
        data.u16(pool.utf8(name));
        write_element_value(pool, data, value);
    }
}

fn write_element_value(pool: &mut ConstantPool, data: &mut Sink, value: &ValueSpec) {
    match value {
        ValueSpec::Byte(v) => {
            data.u8(b'B');
            data.u16(pool.integer(*v as i32));
        }
        ValueSpec::Char(v) => {
            data.u8(b'C');
            data.u16(pool.integer(*v as i32));
        }
        ValueSpec::Short(v) => {
            data.u8(b'S');
            data.u16(pool.integer(*v as i32));
        }
        ValueSpec::Bool(v) => {
            data.u8(b'Z');
            data.u16(pool.integer(*v as i32));
        }
        ValueSpec::Int(v) => {
            data.u8(b'I');
            data.u16(pool.integer(*v));
        }
        ValueSpec::Long(v) => {
            data.u8(b'J');
            data.u16(pool.long(*v));
        }
        ValueSpec::Float(v) => {
            data.u8(b'F');
            data.u16(pool.float(*v));
        }
        ValueSpec::Double(v) => {
            data.u8(b'D');
            data.u16(pool.double(*v));
        }
        ValueSpec::Str(v) => {
            data.u8(b's');
            data.u16(pool.utf8(v));
        }
        ValueSpec::Enum {
            type_name,
            constant,
        } => {
            data.u8(b'e');
            data.u16(pool.utf8(&descriptor_of(type_name)));
            data.u16(pool.utf8(constant));
        }
        ValueSpec::Class(type_name) => {
            data.u8(b'c');
            data.u16(pool.utf8(&descriptor_of(type_name)));
        }
        ValueSpec::Annotation(annotation) => {
            data.u8(b'@');
            write_annotation(pool, data, annotation);
        }
        ValueSpec::Array(values) => {
            data.u8(b'[');
            data.u16(values.len() as u16);
            for v in values {
                write_element_value(pool, data, v);
            }
        }
    }
}

fn code_attribute(pool: &mut ConstantPool, method: &MethodSpec) -> (u16, Vec<u8>) {
    let mut code = Sink::default();
    let mut lines: Vec<(u16, u16)> = Vec::new();

    for instruction in &method.instructions {
        let pc = code.len() as u16;
        match instruction {
            Instruction::Invoke {
                op,
                owner,
                name,
                descriptor,
                line,
            } => {
                let index = if *op == opcode::INVOKEINTERFACE {
                    pool.interface_method_ref(owner, name, descriptor)
                } else {
                    pool.method_ref(owner, name, descriptor)
                };
                code.u8(*op);
                code.u16(index);
                if *op == opcode::INVOKEINTERFACE {
                    code.u8(1);
                    code.u8(0);
                }
                lines.push((pc, *line));
            }
            Instruction::Field {
                op,
                owner,
                name,
                descriptor,
                line,
            } => {
                let index = pool.field_ref(owner, name, descriptor);
                code.u8(*op);
                code.u16(index);
                lines.push((pc, *line));
            }
            Instruction::TypeOp { op, type_name, line } => {
                let index = pool.class(type_name);
                code.u8(*op);
                code.u16(index);
                lines.push((pc, *line));
            }
            Instruction::ClassLiteral { type_name, line } => {
                let index = pool.class(type_name);
                code.u8(opcode::LDC_W);
                code.u16(index);
                lines.push((pc, *line));
            }
            Instruction::Padding { bytes } => {
                for _ in 0..*bytes {
                    code.u8(opcode::NOP);
                }
            }
        }
    }
    code.u8(opcode::RETURN);

    let name = pool.utf8("Code");
    let mut data = Sink::default();
    data.u16(8); // max_stack
    data.u16(8); // max_locals
    let code = code.into_inner();
    data.u32(code.len() as u32);
    data.bytes(&code);
    data.u16(0); // exception table

    if lines.is_empty() {
        data.u16(0);
    } else {
        data.u16(1);
        let lnt_name = pool.utf8("LineNumberTable");
        let mut lnt = Sink::default();
        lnt.u16(lines.len() as u16);
        for (pc, line) in &lines {
            lnt.u16(*pc);
            lnt.u16(*line);
        }
        let lnt = lnt.into_inner();
        data.u16(lnt_name);
        data.u32(lnt.len() as u32);
        data.bytes(&lnt);
    }
    (name, data.into_inner())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Constant {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    NameAndType(u16, u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
}

#[derive(Default)]
struct ConstantPool {
    entries: Vec<Constant>,
    index: HashMap<Constant, u16>,
    next: u16,
}

impl ConstantPool {
    fn add(&mut self, constant: Constant) -> u16 {
        if let Some(&i) = self.index.get(&constant) {
            return i;
        }
        if self.next == 0 {
            self.next = 1;
        }
        let i = self.next;
        let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
        self.next += if wide { 2 } else { 1 };
        self.index.insert(constant.clone(), i);
        self.entries.push(constant);
        i
    }

    fn utf8(&mut self, s: &str) -> u16 {
        self.add(Constant::Utf8(s.to_string()))
    }

    fn integer(&mut self, v: i32) -> u16 {
        self.add(Constant::Integer(v))
    }

    fn float(&mut self, v: f32) -> u16 {
        self.add(Constant::Float(v.to_bits()))
    }

    fn long(&mut self, v: i64) -> u16 {
        self.add(Constant::Long(v))
    }

    fn double(&mut self, v: f64) -> u16 {
        self.add(Constant::Double(v.to_bits()))
    }

    /// Class constant for a dotted name; array names use descriptor form.
    fn class(&mut self, name: &str) -> u16 {
        let internal = if name.ends_with("[]") {
            descriptor_of(name).replace('.', "/")
        } else {
            name.replace('.', "/")
        };
        let utf8 = self.utf8(&internal);
        self.add(Constant::Class(utf8))
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let n = self.utf8(name);
        let d = self.utf8(descriptor);
        self.add(Constant::NameAndType(n, d))
    }

    fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let c = self.class(owner);
        let nt = self.name_and_type(name, descriptor);
        self.add(Constant::FieldRef(c, nt))
    }

    fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let c = self.class(owner);
        let nt = self.name_and_type(name, descriptor);
        self.add(Constant::MethodRef(c, nt))
    }

    fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let c = self.class(owner);
        let nt = self.name_and_type(name, descriptor);
        self.add(Constant::InterfaceMethodRef(c, nt))
    }

    fn write(&self, out: &mut Sink) {
        out.u16(self.next.max(1));
        for entry in &self.entries {
            match entry {
                Constant::Utf8(s) => {
                    out.u8(1);
                    out.u16(s.len() as u16);
                    out.bytes(s.as_bytes());
                }
                Constant::Integer(v) => {
                    out.u8(3);
                    out.u32(*v as u32);
                }
                Constant::Float(bits) => {
                    out.u8(4);
                    out.u32(*bits);
                }
                Constant::Long(v) => {
                    out.u8(5);
                    out.u64(*v as u64);
                }
                Constant::Double(bits) => {
                    out.u8(6);
                    out.u64(*bits);
                }
                Constant::Class(name) => {
                    out.u8(7);
                    out.u16(*name);
                }
                Constant::NameAndType(n, d) => {
                    out.u8(12);
                    out.u16(*n);
                    out.u16(*d);
                }
                Constant::FieldRef(c, nt) => {
                    out.u8(9);
                    out.u16(*c);
                    out.u16(*nt);
                }
                Constant::MethodRef(c, nt) => {
                    out.u8(10);
                    out.u16(*c);
                    out.u16(*nt);
                }
                Constant::InterfaceMethodRef(c, nt) => {
                    out.u8(11);
                    out.u16(*c);
                    out.u16(*nt);
                }
            }
        }
    }
}

/// Big-endian byte sink over a `Vec<u8>`.
#[derive(Default)]
struct Sink {
    buf: Vec<u8>,
}

impl Sink {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.buf
            .write_u16::<BigEndian>(v)
            .expect("writing to a Vec cannot fail");
    }

    fn u32(&mut self, v: u32) {
        self.buf
            .write_u32::<BigEndian>(v)
            .expect("writing to a Vec cannot fail");
    }

    fn u64(&mut self, v: u64) {
        self.buf
            .write_u64::<BigEndian>(v)
            .expect("writing to a Vec cannot fail");
    }

    fn bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Write classes as a package directory tree under `root`.
pub fn write_class_dir(root: &Path, classes: &[(&str, Vec<u8>)]) -> std::io::Result<()> {
    for (name, bytes) in classes {
        let path = root.join(class_entry_name(name));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
    }
    Ok(())
}

/// Assemble a jar (zip) archive in memory from `(entry name, bytes)` pairs.
pub fn jar_bytes(entries: &[(String, Vec<u8>)]) -> std::io::Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, bytes) in entries {
        writer.start_file(name.as_str(), options).map_err(std::io::Error::other)?;
        writer.write_all(bytes)?;
    }
    let cursor = writer.finish().map_err(std::io::Error::other)?;
    Ok(cursor.into_inner())
}

/// Write a jar archive to `path`.
pub fn write_jar(path: &Path, entries: &[(String, Vec<u8>)]) -> std::io::Result<()> {
    let bytes = jar_bytes(entries)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

/// Jar entries for a set of `(class name, bytes)` pairs.
pub fn class_entries(classes: &[(&str, Vec<u8>)]) -> Vec<(String, Vec<u8>)> {
    classes
        .iter()
        .map(|(name, bytes)| (class_entry_name(name), bytes.clone()))
        .collect()
}
