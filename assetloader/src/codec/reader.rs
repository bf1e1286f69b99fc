//! Payload reader.

use bytes::{Buf, Bytes};

use super::{CodecError, CodecResult};

/// Sequential reader over an asset payload.
///
/// Cloning a `Bytes` buffer is cheap, so readers are usually created per
/// decode from the asset's shared payload.
#[derive(Debug, Clone)]
pub struct PackageReader {
    buf: Bytes,
}

impl PackageReader {
    /// Create a reader over a payload.
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Check if the whole payload has been consumed.
    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn need(&self, needed: usize) -> CodecResult<()> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(CodecError::UnexpectedEof { needed, remaining });
        }
        Ok(())
    }

    /// Read a little-endian `i32`.
    pub fn read_i32(&mut self) -> CodecResult<i32> {
        self.need(4)?;
        Ok(self.buf.get_i32_le())
    }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> CodecResult<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    /// Read a little-endian `f32`.
    pub fn read_f32(&mut self) -> CodecResult<f32> {
        self.need(4)?;
        Ok(self.buf.get_f32_le())
    }

    /// Read a boolean byte.
    pub fn read_bool(&mut self) -> CodecResult<bool> {
        self.need(1)?;
        match self.buf.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    /// Read three `f32` values.
    pub fn read_vec3(&mut self) -> CodecResult<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    /// Read four `f32` values.
    pub fn read_vec4(&mut self) -> CodecResult<[f32; 4]> {
        Ok([
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ])
    }

    /// Read a non-negative `i32` count.
    pub fn read_count(&mut self, what: &'static str) -> CodecResult<usize> {
        let count = self.read_i32()?;
        if count < 0 {
            return Err(CodecError::NegativeCount { what, count });
        }
        Ok(count as usize)
    }

    /// Read a 7-bit encoded length prefix.
    ///
    /// The fifth byte carries only the top four bits of a `u32`.
    fn read_length(&mut self) -> CodecResult<usize> {
        let mut value: u32 = 0;
        let mut shift = 0;

        loop {
            self.need(1)?;
            let byte = self.buf.get_u8();
            if shift == 28 && byte > 0x0f {
                return Err(CodecError::BadLength);
            }
            value |= ((byte & 0x7f) as u32) << shift;
            if byte & 0x80 == 0 {
                return Ok(value as usize);
            }
            shift += 7;
        }
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> CodecResult<String> {
        let len = self.read_length()?;
        self.need(len)?;
        let raw = self.buf.split_to(len);
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    /// Read a nested byte block prefixed by its `i32` length.
    pub fn read_block(&mut self) -> CodecResult<Bytes> {
        let len = self.read_count("block")?;
        self.need(len)?;
        Ok(self.buf.split_to(len))
    }
}
