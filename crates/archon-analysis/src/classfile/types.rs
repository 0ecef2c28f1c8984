//! Raw, unlinked records produced by the class-file reader.
//!
//! All type names are dotted (`com.acme.Foo`, `int`, `com.acme.Foo[]`);
//! nothing here refers to another unit except by name.

use serde::{Deserialize, Serialize};

use crate::domain::{AccessKind, MemberKind, Modifiers, TypeReferenceKind, UnitKind};

/// One decoded class file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUnit {
    pub name: String,
    pub kind: UnitKind,
    pub modifiers: Modifiers,
    pub major_version: u16,
    /// Absent only for `java.lang.Object` (and `module-info`).
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub source_file: Option<String>,
    pub members: Vec<RawMember>,
    pub annotations: Vec<RawAnnotation>,
    /// `InnerClasses` entries, verbatim.
    pub nesting: Vec<RawNesting>,
    pub enclosing_method: Option<RawEnclosingMethod>,
}

impl RawUnit {
    /// The `InnerClasses` entry describing this unit itself, if any.
    pub fn own_nesting(&self) -> Option<&RawNesting> {
        self.nesting.iter().find(|n| n.inner == self.name)
    }
}

/// A field, method, or constructor declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMember {
    pub kind: MemberKind,
    pub name: String,
    pub descriptor: String,
    pub modifiers: Modifiers,
    /// Parameter types; empty for fields.
    pub parameter_types: Vec<String>,
    /// Field type for fields, return type for methods, `void` for
    /// constructors.
    pub return_type: String,
    pub throws: Vec<String>,
    pub annotations: Vec<RawAnnotation>,
    pub parameter_annotations: Vec<Vec<RawAnnotation>>,
    pub annotation_default: Option<RawAnnotationValue>,
    /// First line of the body, 0 when unknown.
    pub line: u32,
    pub accesses: Vec<RawAccess>,
    pub type_references: Vec<RawTypeReference>,
}

/// A member access from a code body to another unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAccess {
    pub kind: AccessKind,
    pub owner: String,
    pub name: String,
    pub descriptor: String,
    pub line: u32,
}

/// A non-member type usage in a code body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTypeReference {
    pub kind: TypeReferenceKind,
    pub type_name: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnnotation {
    pub type_name: String,
    pub values: Vec<(String, RawAnnotationValue)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawAnnotationValue {
    Bool(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Enum { type_name: String, constant: String },
    Class(String),
    Annotation(RawAnnotation),
    Array(Vec<RawAnnotationValue>),
}

/// One `InnerClasses` attribute entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNesting {
    pub inner: String,
    /// Absent for local and anonymous units.
    pub outer: Option<String>,
    /// Absent for anonymous units.
    pub simple_name: Option<String>,
    pub modifiers: Modifiers,
}

/// The `EnclosingMethod` attribute of a local or anonymous unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEnclosingMethod {
    pub unit: String,
    /// `(name, descriptor)` of the enclosing method, if any.
    pub method: Option<(String, String)>,
}
