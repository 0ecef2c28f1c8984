//! Small value types shared by the reader, the resolver, and the graph.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of type a unit is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Array,
    Primitive,
}

impl UnitKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Annotation => "annotation",
            Self::Array => "array",
            Self::Primitive => "primitive",
        }
    }

    /// Derive the kind from class access flags.
    pub fn from_flags(modifiers: Modifiers) -> Self {
        if modifiers.contains(Modifiers::ANNOTATION) {
            Self::Annotation
        } else if modifiers.contains(Modifiers::INTERFACE) {
            Self::Interface
        } else if modifiers.contains(Modifiers::ENUM) {
            Self::Enum
        } else {
            Self::Class
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// JVM access flags of a unit or member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers(pub u16);

impl Modifiers {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    /// `ACC_SUPER` on classes, `ACC_SYNCHRONIZED` on methods.
    pub const SUPER: u16 = 0x0020;
    pub const VOLATILE: u16 = 0x0040;
    pub const TRANSIENT: u16 = 0x0080;
    pub const NATIVE: u16 = 0x0100;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;

    pub fn new(flags: u16) -> Self {
        Self(flags)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    pub fn has(self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::PackagePrivate => self.visibility() == Visibility::PackagePrivate,
            other => self.contains(other.flag()),
        }
    }

    pub fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Self::FINAL)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub fn is_synthetic(self) -> bool {
        self.contains(Self::SYNTHETIC)
    }

    pub fn visibility(self) -> Visibility {
        if self.contains(Self::PUBLIC) {
            Visibility::Public
        } else if self.contains(Self::PROTECTED) {
            Visibility::Protected
        } else if self.contains(Self::PRIVATE) {
            Visibility::Private
        } else {
            Visibility::PackagePrivate
        }
    }
}

/// Access level derived from the visibility flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

/// A single source-level modifier, used by rule predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    PackagePrivate,
    Static,
    Final,
    Abstract,
    Synthetic,
}

impl Modifier {
    fn flag(self) -> u16 {
        match self {
            Self::Public => Modifiers::PUBLIC,
            Self::Protected => Modifiers::PROTECTED,
            Self::Private => Modifiers::PRIVATE,
            Self::PackagePrivate => 0,
            Self::Static => Modifiers::STATIC,
            Self::Final => Modifiers::FINAL,
            Self::Abstract => Modifiers::ABSTRACT,
            Self::Synthetic => Modifiers::SYNTHETIC,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Public => "PUBLIC",
            Self::Protected => "PROTECTED",
            Self::Private => "PRIVATE",
            Self::PackagePrivate => "PACKAGE_PRIVATE",
            Self::Static => "STATIC",
            Self::Final => "FINAL",
            Self::Abstract => "ABSTRACT",
            Self::Synthetic => "SYNTHETIC",
        };
        f.write_str(s)
    }
}

/// Field, method, or constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
}

impl MemberKind {
    /// Capitalized noun used in violation messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Field => "Field",
            Self::Method => "Method",
            Self::Constructor => "Constructor",
        }
    }
}

/// What an access edge does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    GetField,
    SetField,
    CallMethod,
    CallConstructor,
}

impl AccessKind {
    /// Verb phrase used in violation messages, e.g. `calls method`.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::GetField => "gets field",
            Self::SetField => "sets field",
            Self::CallMethod => "calls method",
            Self::CallConstructor => "calls constructor",
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Self::CallMethod | Self::CallConstructor)
    }
}

/// Type usage inside a code body that is not a member access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeReferenceKind {
    InstanceOf,
    ClassLiteral,
}

/// Relation a dependency edge was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Extends,
    Implements,
    FieldType,
    ParameterType,
    ReturnType,
    Throws,
    Annotation,
    FieldAccess,
    MethodCall,
    ConstructorCall,
    TypeReference,
}

impl DependencyKind {
    pub fn from_access(kind: AccessKind) -> Self {
        match kind {
            AccessKind::GetField | AccessKind::SetField => Self::FieldAccess,
            AccessKind::CallMethod => Self::MethodCall,
            AccessKind::CallConstructor => Self::ConstructorCall,
        }
    }
}

/// Where in the sources a relation originates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Fully-qualified name of the unit the relation is declared in.
    pub unit: String,
    pub source_file: Option<String>,
    /// Line number, 0 when unknown.
    pub line: u32,
}

impl SourceLocation {
    pub fn new(unit: impl Into<String>, source_file: Option<String>, line: u32) -> Self {
        Self {
            unit: unit.into(),
            source_file,
            line,
        }
    }

    /// The source file, falling back to `<TopLevel>.java` derived from the
    /// unit name.
    pub fn file_name(&self) -> String {
        if let Some(ref file) = self.source_file {
            return file.clone();
        }
        let simple = self.unit.rsplit('.').next().unwrap_or(&self.unit);
        let top_level = simple.split('$').next().unwrap_or(simple);
        format!("{top_level}.java")
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.file_name(), self.line)
    }
}
