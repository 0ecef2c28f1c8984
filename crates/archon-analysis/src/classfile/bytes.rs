//! Bounds-checked big-endian cursor over class-file bytes.

use archon_core::errors::MalformedUnitError;
use byteorder::{BigEndian, ByteOrder};

pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Offset of `data[0]` in the whole class file, for error reporting.
    base: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], MalformedUnitError> {
        if n > self.remaining() {
            return Err(MalformedUnitError::Truncated {
                offset: self.base + self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), MalformedUnitError> {
        self.take(n).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8, MalformedUnitError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, MalformedUnitError> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn u32(&mut self) -> Result<u32, MalformedUnitError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn i32(&mut self) -> Result<i32, MalformedUnitError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn i64(&mut self) -> Result<i64, MalformedUnitError> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    pub fn f32(&mut self) -> Result<f32, MalformedUnitError> {
        Ok(BigEndian::read_f32(self.take(4)?))
    }

    pub fn f64(&mut self) -> Result<f64, MalformedUnitError> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }

    /// Split off the next `len` bytes as an independent reader, e.g. an
    /// attribute body.
    pub fn sub(&mut self, len: usize) -> Result<ByteReader<'a>, MalformedUnitError> {
        let base = self.base + self.pos;
        let data = self.take(len)?;
        Ok(ByteReader { data, pos: 0, base })
    }
}

/// Read a big-endian `u16` at `pos` in a code array.
pub(crate) fn u16_at(code: &[u8], pos: usize) -> Option<u16> {
    code.get(pos..pos + 2).map(BigEndian::read_u16)
}

/// Read a big-endian `i32` at `pos` in a code array.
pub(crate) fn i32_at(code: &[u8], pos: usize) -> Option<i32> {
    code.get(pos..pos + 4).map(BigEndian::read_i32)
}
