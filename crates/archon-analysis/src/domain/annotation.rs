//! Resolved annotations.

use archon_core::types::UnitId;
use serde::Serialize;

/// An annotation on a unit, member, or parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// The annotation type's unit (possibly a stub).
    pub unit: UnitId,
    pub type_name: String,
    /// Explicitly written element values, in declaration order.
    pub values: Vec<(String, AnnotationValue)>,
}

impl Annotation {
    /// The explicitly written value of `name`. Use
    /// [`UnitGraph::annotation_value`](super::UnitGraph::annotation_value)
    /// to fall back to the declared default.
    pub fn explicit_value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn simple_type_name(&self) -> &str {
        self.type_name.rsplit('.').next().unwrap_or(&self.type_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnnotationValue {
    Bool(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Enum {
        unit: UnitId,
        type_name: String,
        constant: String,
    },
    Class {
        unit: UnitId,
        type_name: String,
    },
    Annotation(Box<Annotation>),
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(v) => Some(*v as i64),
            Self::Short(v) => Some(*v as i64),
            Self::Int(v) => Some(*v as i64),
            Self::Long(v) => Some(*v),
            Self::Char(c) => Some(*c as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Units referenced by enum and class values, recursively.
    pub fn referenced_units(&self, out: &mut Vec<UnitId>) {
        match self {
            Self::Enum { unit, .. } | Self::Class { unit, .. } => out.push(*unit),
            Self::Annotation(a) => {
                out.push(a.unit);
                for (_, v) in &a.values {
                    v.referenced_units(out);
                }
            }
            Self::Array(values) => {
                for v in values {
                    v.referenced_units(out);
                }
            }
            _ => {}
        }
    }
}
