//! Payload writer.

use bytes::{BufMut, Bytes, BytesMut};

/// Builder for asset payloads.
///
/// Used by hosts that assemble a content pool in memory (the CLI manifest
/// loader, tests) to produce payloads in the layout [`super::PackageReader`]
/// expects.
#[derive(Debug, Default)]
pub struct PackageWriter {
    buf: BytesMut,
}

impl PackageWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.buf.put_i32_le(value);
        self
    }

    /// Write a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32_le(value);
        self
    }

    /// Write a little-endian `f32`.
    pub fn write_f32(&mut self, value: f32) -> &mut Self {
        self.buf.put_f32_le(value);
        self
    }

    /// Write a boolean byte.
    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.buf.put_u8(value as u8);
        self
    }

    /// Write three `f32` values.
    pub fn write_vec3(&mut self, value: [f32; 3]) -> &mut Self {
        for v in value {
            self.buf.put_f32_le(v);
        }
        self
    }

    /// Write four `f32` values.
    pub fn write_vec4(&mut self, value: [f32; 4]) -> &mut Self {
        for v in value {
            self.buf.put_f32_le(v);
        }
        self
    }

    /// Write a count as `i32`.
    pub fn write_count(&mut self, count: usize) -> &mut Self {
        self.write_i32(count as i32)
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        let mut len = value.len() as u32;
        while len >= 0x80 {
            self.buf.put_u8((len as u8) | 0x80);
            len >>= 7;
        }
        self.buf.put_u8(len as u8);
        self.buf.put_slice(value.as_bytes());
        self
    }

    /// Write a nested byte block prefixed by its `i32` length.
    pub fn write_block(&mut self, block: &[u8]) -> &mut Self {
        self.write_count(block.len());
        self.buf.put_slice(block);
        self
    }

    /// Finish and return the payload.
    pub fn finish(&mut self) -> Bytes {
        std::mem::take(&mut self.buf).freeze()
    }
}
