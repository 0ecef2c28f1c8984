//! Scans a `Code` attribute for accesses to other units.

use archon_core::errors::MalformedUnitError;

use super::bytes::{i32_at, u16_at};
use super::constant_pool::ConstantPool;
use super::types::{RawAccess, RawTypeReference};
use crate::domain::{AccessKind, TypeReferenceKind};

mod op {
    pub const LDC: u8 = 0x12;
    pub const LDC_W: u8 = 0x13;
    pub const TABLESWITCH: u8 = 0xaa;
    pub const LOOKUPSWITCH: u8 = 0xab;
    pub const GETSTATIC: u8 = 0xb2;
    pub const PUTSTATIC: u8 = 0xb3;
    pub const GETFIELD: u8 = 0xb4;
    pub const PUTFIELD: u8 = 0xb5;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
    pub const INVOKESPECIAL: u8 = 0xb7;
    pub const INVOKESTATIC: u8 = 0xb8;
    pub const INVOKEINTERFACE: u8 = 0xb9;
    pub const INSTANCEOF: u8 = 0xc1;
    pub const WIDE: u8 = 0xc4;
    pub const IINC: u8 = 0x84;
}

#[derive(Debug, Default)]
pub(crate) struct CodeScan {
    pub accesses: Vec<RawAccess>,
    pub type_references: Vec<RawTypeReference>,
}

/// Line table lookup: the entry with the greatest `start_pc <= pc`.
pub(crate) struct LineTable {
    entries: Vec<(u16, u16)>,
}

impl LineTable {
    pub fn new(mut entries: Vec<(u16, u16)>) -> Self {
        entries.sort_unstable();
        Self { entries }
    }

    pub fn line_at(&self, pc: usize) -> u32 {
        let idx = self.entries.partition_point(|(start, _)| (*start as usize) <= pc);
        if idx == 0 {
            0
        } else {
            self.entries[idx - 1].1 as u32
        }
    }

    pub fn first_line(&self) -> u32 {
        self.entries.iter().map(|(_, l)| *l as u32).min().unwrap_or(0)
    }
}

fn malformed(message: String) -> MalformedUnitError {
    MalformedUnitError::MalformedAttribute {
        attribute: "Code",
        message,
    }
}

/// Length in bytes of the instruction at `pc`.
fn instruction_length(code: &[u8], pc: usize) -> Result<usize, MalformedUnitError> {
    let opcode = code[pc];
    let len = match opcode {
        0x10 | 0x12 | 0x15..=0x19 | 0x36..=0x3a | 0xa9 | 0xbc => 2,
        0x11 | 0x13 | 0x14 | 0x84 | 0x99..=0xa8 | 0xb2..=0xb8 | 0xbb | 0xbd | 0xc0 | 0xc1
        | 0xc6 | 0xc7 => 3,
        0xc5 => 4,
        0xb9 | 0xba | 0xc8 | 0xc9 => 5,
        op::WIDE => match code.get(pc + 1) {
            Some(&op::IINC) => 6,
            Some(_) => 4,
            None => return Err(malformed(format!("truncated wide instruction at {pc}"))),
        },
        op::TABLESWITCH => {
            let base = pc + 1 + padding(pc);
            let low = i32_at(code, base + 4);
            let high = i32_at(code, base + 8);
            match (low, high) {
                (Some(low), Some(high)) if high >= low => {
                    let count = (high as i64 - low as i64 + 1) as usize;
                    base - pc + 12 + count * 4
                }
                _ => return Err(malformed(format!("bad tableswitch at {pc}"))),
            }
        }
        op::LOOKUPSWITCH => {
            let base = pc + 1 + padding(pc);
            match i32_at(code, base + 4) {
                Some(pairs) if pairs >= 0 => base - pc + 8 + pairs as usize * 8,
                _ => return Err(malformed(format!("bad lookupswitch at {pc}"))),
            }
        }
        0x00..=0x0f | 0x1a..=0x35 | 0x3b..=0x83 | 0x85..=0x98 | 0xac..=0xb1 | 0xbe | 0xbf
        | 0xc2 | 0xc3 | 0xca | 0xfe | 0xff => 1,
        other => return Err(malformed(format!("unknown opcode 0x{other:02x} at {pc}"))),
    };
    Ok(len)
}

/// Switch operands are aligned to 4 bytes from the start of the code.
fn padding(pc: usize) -> usize {
    (4 - (pc + 1) % 4) % 4
}

/// Walk every instruction, recording accesses whose owner is not `this_unit`.
pub(crate) fn scan_code(
    code: &[u8],
    pool: &ConstantPool,
    lines: &LineTable,
    this_unit: &str,
) -> Result<CodeScan, MalformedUnitError> {
    let mut scan = CodeScan::default();
    let mut pc = 0;
    while pc < code.len() {
        let opcode = code[pc];
        let len = instruction_length(code, pc)?;
        if pc + len > code.len() {
            return Err(malformed(format!("instruction at {pc} runs past end of code")));
        }
        let operand = || u16_at(code, pc + 1).unwrap_or(0);
        match opcode {
            op::GETSTATIC | op::PUTSTATIC | op::GETFIELD | op::PUTFIELD | op::INVOKEVIRTUAL
            | op::INVOKESPECIAL | op::INVOKESTATIC | op::INVOKEINTERFACE => {
                let member = pool.member_ref(operand())?;
                if member.owner != this_unit {
                    let kind = match opcode {
                        op::GETSTATIC | op::GETFIELD => AccessKind::GetField,
                        op::PUTSTATIC | op::PUTFIELD => AccessKind::SetField,
                        _ if member.name == "<init>" => AccessKind::CallConstructor,
                        _ => AccessKind::CallMethod,
                    };
                    scan.accesses.push(RawAccess {
                        kind,
                        owner: member.owner,
                        name: member.name.to_string(),
                        descriptor: member.descriptor.to_string(),
                        line: lines.line_at(pc),
                    });
                }
            }
            op::INSTANCEOF => {
                let type_name = pool.class_name(operand())?;
                if type_name != this_unit {
                    scan.type_references.push(RawTypeReference {
                        kind: TypeReferenceKind::InstanceOf,
                        type_name,
                        line: lines.line_at(pc),
                    });
                }
            }
            op::LDC | op::LDC_W => {
                let index = if opcode == op::LDC {
                    code[pc + 1] as u16
                } else {
                    operand()
                };
                if let Some(type_name) = pool.class_name_if_class(index)? {
                    if type_name != this_unit {
                        scan.type_references.push(RawTypeReference {
                            kind: TypeReferenceKind::ClassLiteral,
                            type_name,
                            line: lines.line_at(pc),
                        });
                    }
                }
            }
            _ => {}
        }
        pc += len;
    }
    Ok(scan)
}
