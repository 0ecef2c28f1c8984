//! Field and method descriptor parsing.
//!
//! Types are rendered as dotted names: `int`, `java.lang.String`,
//! `java.lang.String[][]`.

use archon_core::errors::MalformedUnitError;

/// Parameter and return types of a method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<String>,
    pub return_type: String,
}

fn invalid(descriptor: &str) -> MalformedUnitError {
    MalformedUnitError::InvalidDescriptor {
        descriptor: descriptor.to_string(),
    }
}

/// Parse one type starting at `*pos`, advancing past it.
fn parse_type(descriptor: &str, pos: &mut usize, allow_void: bool) -> Result<String, MalformedUnitError> {
    let bytes = descriptor.as_bytes();
    let mut dimensions = 0usize;
    while bytes.get(*pos) == Some(&b'[') {
        dimensions += 1;
        *pos += 1;
    }
    let c = *bytes.get(*pos).ok_or_else(|| invalid(descriptor))?;
    *pos += 1;
    let base = match c {
        b'B' => "byte".to_string(),
        b'C' => "char".to_string(),
        b'D' => "double".to_string(),
        b'F' => "float".to_string(),
        b'I' => "int".to_string(),
        b'J' => "long".to_string(),
        b'S' => "short".to_string(),
        b'Z' => "boolean".to_string(),
        b'V' if allow_void && dimensions == 0 => "void".to_string(),
        b'L' => {
            let start = *pos;
            let end = descriptor[start..]
                .find(';')
                .map(|i| start + i)
                .ok_or_else(|| invalid(descriptor))?;
            if end == start {
                return Err(invalid(descriptor));
            }
            *pos = end + 1;
            descriptor[start..end].replace('/', ".")
        }
        _ => return Err(invalid(descriptor)),
    };
    let mut name = base;
    for _ in 0..dimensions {
        name.push_str("[]");
    }
    Ok(name)
}

/// Parse a field descriptor such as `[Ljava/lang/String;`.
pub fn parse_field_descriptor(descriptor: &str) -> Result<String, MalformedUnitError> {
    let mut pos = 0;
    let name = parse_type(descriptor, &mut pos, false)?;
    if pos != descriptor.len() {
        return Err(invalid(descriptor));
    }
    Ok(name)
}

/// Parse a method descriptor such as `(ILjava/lang/String;)V`.
pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptor, MalformedUnitError> {
    let bytes = descriptor.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(invalid(descriptor));
    }
    let mut pos = 1;
    let mut parameters = Vec::new();
    loop {
        match bytes.get(pos) {
            Some(b')') => {
                pos += 1;
                break;
            }
            Some(_) => parameters.push(parse_type(descriptor, &mut pos, false)?),
            None => return Err(invalid(descriptor)),
        }
    }
    let return_type = parse_type(descriptor, &mut pos, true)?;
    if pos != descriptor.len() {
        return Err(invalid(descriptor));
    }
    Ok(MethodDescriptor {
        parameters,
        return_type,
    })
}

/// Parse a return-type descriptor, which may be `V`.
pub fn parse_return_descriptor(descriptor: &str) -> Result<String, MalformedUnitError> {
    let mut pos = 0;
    let name = parse_type(descriptor, &mut pos, true)?;
    if pos != descriptor.len() {
        return Err(invalid(descriptor));
    }
    Ok(name)
}

/// Convert a `CONSTANT_Class` internal name to a dotted name. Array classes
/// are stored in descriptor form (`[I`) and become `int[]`.
pub fn internal_to_dotted(internal: &str) -> Result<String, MalformedUnitError> {
    if internal.starts_with('[') {
        parse_field_descriptor(internal)
    } else {
        Ok(internal.replace('/', "."))
    }
}

/// Whether a dotted type name is a primitive (including `void`).
pub fn is_primitive(name: &str) -> bool {
    matches!(
        name,
        "byte" | "char" | "double" | "float" | "int" | "long" | "short" | "boolean" | "void"
    )
}

/// Strip all array dimensions from a dotted type name.
pub fn element_type(name: &str) -> &str {
    let mut n = name;
    while let Some(stripped) = n.strip_suffix("[]") {
        n = stripped;
    }
    n
}
