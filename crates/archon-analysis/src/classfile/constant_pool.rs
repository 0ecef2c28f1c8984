//! Constant pool decoding.

use archon_core::errors::MalformedUnitError;

use super::bytes::ByteReader;
use super::descriptor::internal_to_dotted;

#[derive(Debug, Clone)]
pub(crate) enum Constant {
    /// Index 0 and the second slot of `Long`/`Double`.
    Unusable,
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String,
    FieldRef { class: u16, name_and_type: u16 },
    MethodRef { class: u16, name_and_type: u16 },
    InterfaceMethodRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

/// A decoded member reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MemberRef<'a> {
    pub owner: String,
    pub name: &'a str,
    pub descriptor: &'a str,
}

#[derive(Debug)]
pub(crate) struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub fn parse(r: &mut ByteReader<'_>) -> Result<Self, MalformedUnitError> {
        let count = r.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable);
        let mut index = 1u16;
        while index < count {
            let tag = r.u8()?;
            let constant = match tag {
                1 => {
                    let len = r.u16()? as usize;
                    let bytes = r.take(len)?;
                    Constant::Utf8(decode_modified_utf8(bytes).ok_or(
                        MalformedUnitError::InvalidConstant {
                            index,
                            expected: "modified UTF-8",
                        },
                    )?)
                }
                3 => Constant::Integer(r.i32()?),
                4 => Constant::Float(r.f32()?),
                5 => Constant::Long(r.i64()?),
                6 => Constant::Double(r.f64()?),
                7 => Constant::Class(r.u16()?),
                8 => {
                    r.skip(2)?;
                    Constant::String
                }
                9 => Constant::FieldRef {
                    class: r.u16()?,
                    name_and_type: r.u16()?,
                },
                10 => Constant::MethodRef {
                    class: r.u16()?,
                    name_and_type: r.u16()?,
                },
                11 => Constant::InterfaceMethodRef {
                    class: r.u16()?,
                    name_and_type: r.u16()?,
                },
                12 => Constant::NameAndType {
                    name: r.u16()?,
                    descriptor: r.u16()?,
                },
                15 => {
                    r.skip(3)?;
                    Constant::MethodHandle
                }
                16 => {
                    r.skip(2)?;
                    Constant::MethodType
                }
                17 => {
                    r.skip(4)?;
                    Constant::Dynamic
                }
                18 => {
                    r.skip(4)?;
                    Constant::InvokeDynamic
                }
                19 => {
                    r.skip(2)?;
                    Constant::Module
                }
                20 => {
                    r.skip(2)?;
                    Constant::Package
                }
                _ => return Err(MalformedUnitError::UnknownConstantTag { tag, index }),
            };
            let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
            entries.push(constant);
            index += 1;
            if wide {
                entries.push(Constant::Unusable);
                index += 1;
            }
        }
        Ok(Self { entries })
    }

    fn get(&self, index: u16, expected: &'static str) -> Result<&Constant, MalformedUnitError> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => {
                Err(MalformedUnitError::InvalidConstant { index, expected })
            }
            Some(c) => Ok(c),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&str, MalformedUnitError> {
        match self.get(index, "Utf8")? {
            Constant::Utf8(s) => Ok(s),
            _ => Err(MalformedUnitError::InvalidConstant {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Dotted name of a `CONSTANT_Class` entry.
    pub fn class_name(&self, index: u16) -> Result<String, MalformedUnitError> {
        match self.get(index, "Class")? {
            Constant::Class(name) => internal_to_dotted(self.utf8(*name)?),
            _ => Err(MalformedUnitError::InvalidConstant {
                index,
                expected: "Class",
            }),
        }
    }

    /// Class name if the entry is a `CONSTANT_Class`, `None` for any other
    /// loadable constant.
    pub fn class_name_if_class(&self, index: u16) -> Result<Option<String>, MalformedUnitError> {
        match self.get(index, "loadable constant")? {
            Constant::Class(_) => self.class_name(index).map(Some),
            _ => Ok(None),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str), MalformedUnitError> {
        match self.get(index, "NameAndType")? {
            Constant::NameAndType { name, descriptor } => {
                Ok((self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            _ => Err(MalformedUnitError::InvalidConstant {
                index,
                expected: "NameAndType",
            }),
        }
    }

    /// Decode a field, method, or interface method reference.
    pub fn member_ref(&self, index: u16) -> Result<MemberRef<'_>, MalformedUnitError> {
        let (class, name_and_type) = match self.get(index, "member reference")? {
            Constant::FieldRef {
                class,
                name_and_type,
            }
            | Constant::MethodRef {
                class,
                name_and_type,
            }
            | Constant::InterfaceMethodRef {
                class,
                name_and_type,
            } => (*class, *name_and_type),
            _ => {
                return Err(MalformedUnitError::InvalidConstant {
                    index,
                    expected: "member reference",
                })
            }
        };
        let owner = self.class_name(class)?;
        let (name, descriptor) = self.name_and_type(name_and_type)?;
        Ok(MemberRef {
            owner,
            name,
            descriptor,
        })
    }

    pub fn integer(&self, index: u16) -> Result<i32, MalformedUnitError> {
        match self.get(index, "Integer")? {
            Constant::Integer(v) => Ok(*v),
            _ => Err(MalformedUnitError::InvalidConstant {
                index,
                expected: "Integer",
            }),
        }
    }

    pub fn long(&self, index: u16) -> Result<i64, MalformedUnitError> {
        match self.get(index, "Long")? {
            Constant::Long(v) => Ok(*v),
            _ => Err(MalformedUnitError::InvalidConstant {
                index,
                expected: "Long",
            }),
        }
    }

    pub fn float(&self, index: u16) -> Result<f32, MalformedUnitError> {
        match self.get(index, "Float")? {
            Constant::Float(v) => Ok(*v),
            _ => Err(MalformedUnitError::InvalidConstant {
                index,
                expected: "Float",
            }),
        }
    }

    pub fn double(&self, index: u16) -> Result<f64, MalformedUnitError> {
        match self.get(index, "Double")? {
            Constant::Double(v) => Ok(*v),
            _ => Err(MalformedUnitError::InvalidConstant {
                index,
                expected: "Double",
            }),
        }
    }
}

/// Decode the JVM's modified UTF-8: `0xC0 0x80` encodes NUL and
/// supplementary characters are stored as two 3-byte surrogates.
pub(crate) fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            if b == 0 {
                return None;
            }
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = *bytes.get(i + 1)?;
            if b2 & 0xC0 != 0x80 {
                return None;
            }
            units.push((((b & 0x1F) as u16) << 6) | (b2 & 0x3F) as u16);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = *bytes.get(i + 1)?;
            let b3 = *bytes.get(i + 2)?;
            if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                return None;
            }
            units.push((((b & 0x0F) as u16) << 12) | (((b2 & 0x3F) as u16) << 6) | (b3 & 0x3F) as u16);
            i += 3;
        } else {
            return None;
        }
    }
    Some(
        char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    )
}
