//! Class-file reader: bytes to [`RawUnit`].

use archon_core::errors::MalformedUnitError;

use super::bytecode::{scan_code, CodeScan, LineTable};
use super::bytes::ByteReader;
use super::constant_pool::ConstantPool;
use super::descriptor::{parse_field_descriptor, parse_method_descriptor, parse_return_descriptor};
use super::types::*;
use crate::domain::{MemberKind, Modifiers, UnitKind};

const MAGIC: u32 = 0xCAFE_BABE;

/// Oldest supported major version (JDK 1.1).
pub const MIN_MAJOR_VERSION: u16 = 45;
/// Newest supported major version (Java 21).
pub const MAX_MAJOR_VERSION: u16 = 65;

/// Decode one class file. Names are never resolved.
pub fn read(bytes: &[u8]) -> Result<RawUnit, MalformedUnitError> {
    let mut r = ByteReader::new(bytes);

    let magic = r.u32()?;
    if magic != MAGIC {
        return Err(MalformedUnitError::BadMagic { found: magic });
    }
    let minor = r.u16()?;
    let major = r.u16()?;
    if !(MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&major) {
        return Err(MalformedUnitError::UnsupportedVersion { major, minor });
    }

    let pool = ConstantPool::parse(&mut r)?;

    let access = r.u16()?;
    let name = pool.class_name(r.u16()?)?;
    let super_index = r.u16()?;
    let superclass = if super_index == 0 {
        None
    } else {
        Some(pool.class_name(super_index)?)
    };
    let interface_count = r.u16()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interfaces.push(pool.class_name(r.u16()?)?);
    }

    let mut members = Vec::new();
    let field_count = r.u16()?;
    for _ in 0..field_count {
        members.push(read_field(&mut r, &pool)?);
    }
    let method_count = r.u16()?;
    for _ in 0..method_count {
        members.push(read_method(&mut r, &pool, &name)?);
    }

    let mut unit = RawUnit {
        kind: UnitKind::from_flags(Modifiers::new(access)),
        modifiers: Modifiers::new(access & !Modifiers::SUPER),
        name,
        major_version: major,
        superclass,
        interfaces,
        source_file: None,
        members,
        annotations: Vec::new(),
        nesting: Vec::new(),
        enclosing_method: None,
    };

    let attribute_count = r.u16()?;
    for _ in 0..attribute_count {
        let (attribute, mut body) = read_attribute(&mut r, &pool)?;
        match attribute {
            "SourceFile" => unit.source_file = Some(pool.utf8(body.u16()?)?.to_string()),
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                unit.annotations.extend(read_annotations(&mut body, &pool)?);
            }
            "InnerClasses" => unit.nesting = read_inner_classes(&mut body, &pool)?,
            "EnclosingMethod" => {
                let unit_name = pool.class_name(body.u16()?)?;
                let method_index = body.u16()?;
                let method = if method_index == 0 {
                    None
                } else {
                    let (n, d) = pool.name_and_type(method_index)?;
                    Some((n.to_string(), d.to_string()))
                };
                unit.enclosing_method = Some(RawEnclosingMethod {
                    unit: unit_name,
                    method,
                });
            }
            _ => {}
        }
    }

    // Nested units carry their source-level modifiers in InnerClasses.
    if let Some(own_flags) = unit.own_nesting().map(|n| n.modifiers.bits()) {
        let kind_flags = unit.modifiers.bits()
            & (Modifiers::INTERFACE | Modifiers::ANNOTATION | Modifiers::ENUM);
        unit.modifiers = Modifiers::new(own_flags | kind_flags);
    }

    Ok(unit)
}

/// Read an attribute header and split off its body.
fn read_attribute<'a, 'p>(
    r: &mut ByteReader<'a>,
    pool: &'p ConstantPool,
) -> Result<(&'p str, ByteReader<'a>), MalformedUnitError> {
    let name = pool.utf8(r.u16()?)?;
    let len = r.u32()? as usize;
    Ok((name, r.sub(len)?))
}

fn read_field(r: &mut ByteReader<'_>, pool: &ConstantPool) -> Result<RawMember, MalformedUnitError> {
    let access = r.u16()?;
    let name = pool.utf8(r.u16()?)?.to_string();
    let descriptor = pool.utf8(r.u16()?)?.to_string();
    let field_type = parse_field_descriptor(&descriptor)?;

    let mut annotations = Vec::new();
    let attribute_count = r.u16()?;
    for _ in 0..attribute_count {
        let (attribute, mut body) = read_attribute(r, pool)?;
        if let "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" = attribute {
            annotations.extend(read_annotations(&mut body, pool)?);
        }
    }

    Ok(RawMember {
        kind: MemberKind::Field,
        name,
        descriptor,
        modifiers: Modifiers::new(access),
        parameter_types: Vec::new(),
        return_type: field_type,
        throws: Vec::new(),
        annotations,
        parameter_annotations: Vec::new(),
        annotation_default: None,
        line: 0,
        accesses: Vec::new(),
        type_references: Vec::new(),
    })
}

fn read_method(
    r: &mut ByteReader<'_>,
    pool: &ConstantPool,
    this_unit: &str,
) -> Result<RawMember, MalformedUnitError> {
    let access = r.u16()?;
    let name = pool.utf8(r.u16()?)?.to_string();
    let descriptor = pool.utf8(r.u16()?)?.to_string();
    let signature = parse_method_descriptor(&descriptor)?;
    let kind = if name == "<init>" {
        MemberKind::Constructor
    } else {
        MemberKind::Method
    };

    let mut member = RawMember {
        kind,
        name,
        descriptor,
        modifiers: Modifiers::new(access),
        parameter_types: signature.parameters,
        return_type: signature.return_type,
        throws: Vec::new(),
        annotations: Vec::new(),
        parameter_annotations: Vec::new(),
        annotation_default: None,
        line: 0,
        accesses: Vec::new(),
        type_references: Vec::new(),
    };

    let attribute_count = r.u16()?;
    for _ in 0..attribute_count {
        let (attribute, mut body) = read_attribute(r, pool)?;
        match attribute {
            "Code" => {
                let (scan, first_line) = read_code(&mut body, pool, this_unit)?;
                member.accesses = scan.accesses;
                member.type_references = scan.type_references;
                member.line = first_line;
            }
            "Exceptions" => {
                let count = body.u16()?;
                for _ in 0..count {
                    member.throws.push(pool.class_name(body.u16()?)?);
                }
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                member.annotations.extend(read_annotations(&mut body, pool)?);
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                let count = body.u8()? as usize;
                if member.parameter_annotations.len() < count {
                    member.parameter_annotations.resize(count, Vec::new());
                }
                for slot in member.parameter_annotations.iter_mut().take(count) {
                    slot.extend(read_annotations(&mut body, pool)?);
                }
            }
            "AnnotationDefault" => {
                member.annotation_default = Some(read_element_value(&mut body, pool)?);
            }
            _ => {}
        }
    }
    Ok(member)
}

fn read_code(
    body: &mut ByteReader<'_>,
    pool: &ConstantPool,
    this_unit: &str,
) -> Result<(CodeScan, u32), MalformedUnitError> {
    body.skip(4)?; // max_stack, max_locals
    let code_len = body.u32()? as usize;
    let code = body.take(code_len)?;
    let exception_count = body.u16()? as usize;
    body.skip(exception_count * 8)?;

    let mut line_entries = Vec::new();
    let attribute_count = body.u16()?;
    for _ in 0..attribute_count {
        let (attribute, mut nested) = read_attribute(body, pool)?;
        if attribute == "LineNumberTable" {
            let count = nested.u16()?;
            for _ in 0..count {
                line_entries.push((nested.u16()?, nested.u16()?));
            }
        }
    }
    let lines = LineTable::new(line_entries);
    let scan = scan_code(code, pool, &lines, this_unit)?;
    Ok((scan, lines.first_line()))
}

fn read_inner_classes(
    body: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<RawNesting>, MalformedUnitError> {
    let count = body.u16()?;
    let mut entries = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let inner = pool.class_name(body.u16()?)?;
        let outer_index = body.u16()?;
        let name_index = body.u16()?;
        let flags = body.u16()?;
        entries.push(RawNesting {
            inner,
            outer: if outer_index == 0 {
                None
            } else {
                Some(pool.class_name(outer_index)?)
            },
            simple_name: if name_index == 0 {
                None
            } else {
                Some(pool.utf8(name_index)?.to_string())
            },
            modifiers: Modifiers::new(flags),
        });
    }
    Ok(entries)
}

fn read_annotations(
    body: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<Vec<RawAnnotation>, MalformedUnitError> {
    let count = body.u16()?;
    let mut annotations = Vec::with_capacity(count as usize);
    for _ in 0..count {
        annotations.push(read_annotation(body, pool)?);
    }
    Ok(annotations)
}

fn read_annotation(
    body: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<RawAnnotation, MalformedUnitError> {
    let type_name = parse_field_descriptor(pool.utf8(body.u16()?)?)?;
    let pairs = body.u16()?;
    let mut values = Vec::with_capacity(pairs as usize);
    for _ in 0..pairs {
        let name = pool.utf8(body.u16()?)?.to_string();
        values.push((name, read_element_value(body, pool)?));
    }
    Ok(RawAnnotation { type_name, values })
}

fn read_element_value(
    body: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<RawAnnotationValue, MalformedUnitError> {
    let tag = body.u8()?;
    let value = match tag {
        b'B' => RawAnnotationValue::Byte(pool.integer(body.u16()?)? as i8),
        b'C' => {
            let code = pool.integer(body.u16()?)? as u32;
            RawAnnotationValue::Char(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
        }
        b'S' => RawAnnotationValue::Short(pool.integer(body.u16()?)? as i16),
        b'Z' => RawAnnotationValue::Bool(pool.integer(body.u16()?)? != 0),
        b'I' => RawAnnotationValue::Int(pool.integer(body.u16()?)?),
        b'J' => RawAnnotationValue::Long(pool.long(body.u16()?)?),
        b'F' => RawAnnotationValue::Float(pool.float(body.u16()?)?),
        b'D' => RawAnnotationValue::Double(pool.double(body.u16()?)?),
        b's' => RawAnnotationValue::String(pool.utf8(body.u16()?)?.to_string()),
        b'e' => {
            let type_name = parse_field_descriptor(pool.utf8(body.u16()?)?)?;
            let constant = pool.utf8(body.u16()?)?.to_string();
            RawAnnotationValue::Enum {
                type_name,
                constant,
            }
        }
        b'c' => RawAnnotationValue::Class(parse_return_descriptor(pool.utf8(body.u16()?)?)?),
        b'@' => RawAnnotationValue::Annotation(read_annotation(body, pool)?),
        b'[' => {
            let count = body.u16()?;
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(read_element_value(body, pool)?);
            }
            RawAnnotationValue::Array(values)
        }
        other => {
            return Err(MalformedUnitError::MalformedAttribute {
                attribute: "annotation",
                message: format!("unknown element value tag '{}'", other as char),
            })
        }
    };
    Ok(value)
}
