//! Members: fields, methods, and constructors.

use archon_core::types::collections::SmallVec4;
use archon_core::types::{AccessId, MemberId, UnitId};

use super::annotation::{Annotation, AnnotationValue};
use super::types::{MemberKind, Modifiers};

/// Attributes every member kind carries.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub id: MemberId,
    pub owner: UnitId,
    pub name: String,
    pub descriptor: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    /// `com.acme.Foo.bar(int, java.lang.String)` or `com.acme.Foo.field`.
    pub full_name: String,
    /// First line of the body, 0 when unknown.
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub info: MemberInfo,
    pub field_type: UnitId,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub info: MemberInfo,
    pub parameters: SmallVec4<UnitId>,
    pub return_type: UnitId,
    pub throws: SmallVec4<UnitId>,
    pub parameter_annotations: Vec<Vec<Annotation>>,
    /// Default of an annotation type element.
    pub annotation_default: Option<AnnotationValue>,
    pub accesses: Vec<AccessId>,
}

#[derive(Debug, Clone)]
pub struct Constructor {
    pub info: MemberInfo,
    pub parameters: SmallVec4<UnitId>,
    pub throws: SmallVec4<UnitId>,
    pub parameter_annotations: Vec<Vec<Annotation>>,
    pub accesses: Vec<AccessId>,
}

/// A member owned by exactly one unit.
#[derive(Debug, Clone)]
pub enum Member {
    Field(Field),
    Method(Method),
    Constructor(Constructor),
}

impl Member {
    pub fn info(&self) -> &MemberInfo {
        match self {
            Self::Field(f) => &f.info,
            Self::Method(m) => &m.info,
            Self::Constructor(c) => &c.info,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match self {
            Self::Field(_) => MemberKind::Field,
            Self::Method(_) => MemberKind::Method,
            Self::Constructor(_) => MemberKind::Constructor,
        }
    }

    pub fn id(&self) -> MemberId {
        self.info().id
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn descriptor(&self) -> &str {
        &self.info().descriptor
    }

    pub fn full_name(&self) -> &str {
        &self.info().full_name
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Self::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Self::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<&Constructor> {
        match self {
            Self::Constructor(c) => Some(c),
            _ => None,
        }
    }

    /// Parameter types; empty for fields.
    pub fn parameters(&self) -> &[UnitId] {
        match self {
            Self::Field(_) => &[],
            Self::Method(m) => &m.parameters,
            Self::Constructor(c) => &c.parameters,
        }
    }

    pub fn throws(&self) -> &[UnitId] {
        match self {
            Self::Field(_) => &[],
            Self::Method(m) => &m.throws,
            Self::Constructor(c) => &c.throws,
        }
    }

    /// Accesses made from this member's body.
    pub fn accesses(&self) -> &[AccessId] {
        match self {
            Self::Field(_) => &[],
            Self::Method(m) => &m.accesses,
            Self::Constructor(c) => &c.accesses,
        }
    }

    /// `Method <com.acme.Foo.bar(int)>`.
    pub fn describe(&self) -> String {
        describe(self.kind(), self.full_name())
    }
}

pub(crate) fn describe(kind: MemberKind, full_name: &str) -> String {
    format!("{} <{}>", kind.label(), full_name)
}

/// `owner.name(p1, p2)` for code members, `owner.name` for fields.
pub(crate) fn full_name(owner: &str, kind: MemberKind, name: &str, parameters: &[String]) -> String {
    match kind {
        MemberKind::Field => format!("{owner}.{name}"),
        _ => format!("{owner}.{name}({})", parameters.join(", ")),
    }
}
