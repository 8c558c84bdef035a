//! Sequential reader and writer for message bodies.
//!
//! All integers are **little endian** except where a `_be` function says otherwise.
//! Strings are NUL terminated.
//!
//! Reading past the end never panics, it returns [`MessageError::Underflow`] with the amount
//! of bytes that were missing. The auth connection uses this to wait for the rest of a message,
//! everywhere else it means the message is malformed.
//!
//! ```
//! use wow_client::message::{MessageReader, MessageWriter};
//!
//! let mut writer = MessageWriter::new();
//! writer.write_u32(0xDEADBEEF);
//! writer.write_cstring("Alice");
//!
//! let bytes = writer.into_vec();
//! let mut reader = MessageReader::new(&bytes);
//! assert_eq!(reader.read_u32().unwrap(), 0xDEADBEEF);
//! assert_eq!(reader.read_cstring().unwrap(), "Alice");
//! assert!(reader.is_empty());
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::error::MessageError;

/// Reads values from the front of a byte slice.
#[derive(Debug, Clone)]
pub struct MessageReader<'a> {
    buf: &'a [u8],
    length: usize,
}

impl<'a> MessageReader<'a> {
    /// Creates a reader starting at the first byte of `buf`.
    pub const fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            length: buf.len(),
        }
    }

    /// Amount of bytes read so far.
    pub const fn position(&self) -> usize {
        self.length - self.buf.len()
    }

    /// Amount of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// `true` when every byte has been read.
    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn ensure(&self, amount: usize) -> Result<(), MessageError> {
        let remaining = self.buf.remaining();
        if remaining < amount {
            return Err(MessageError::Underflow {
                needed: amount - remaining,
            });
        }

        Ok(())
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> Result<u8, MessageError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    /// Reads a little endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, MessageError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }

    /// Reads a big endian `u16`.
    pub fn read_u16_be(&mut self) -> Result<u16, MessageError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    /// Reads a little endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, MessageError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    /// Reads a little endian `u64`.
    pub fn read_u64(&mut self) -> Result<u64, MessageError> {
        self.ensure(8)?;
        Ok(self.buf.get_u64_le())
    }

    /// Reads a little endian `f32`.
    pub fn read_f32(&mut self) -> Result<f32, MessageError> {
        self.ensure(4)?;
        Ok(self.buf.get_f32_le())
    }

    /// Reads a fixed size array, used for keys and hashes.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], MessageError> {
        self.ensure(N)?;

        let mut array = [0_u8; N];
        self.buf.copy_to_slice(&mut array);

        Ok(array)
    }

    /// Reads `amount` raw bytes.
    pub fn read_bytes(&mut self, amount: usize) -> Result<&'a [u8], MessageError> {
        self.ensure(amount)?;

        let (bytes, rest) = self.buf.split_at(amount);
        self.buf = rest;

        Ok(bytes)
    }

    /// Reads up to and including the NUL terminator, which is not part of the returned string.
    ///
    /// A missing terminator is an underflow of one byte.
    pub fn read_cstring(&mut self) -> Result<String, MessageError> {
        let end = self
            .buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(MessageError::Underflow { needed: 1 })?;

        let s = std::str::from_utf8(&self.buf[..end])
            .map_err(|_| MessageError::InvalidString)?
            .to_string();
        self.buf.advance(end + 1);

        Ok(s)
    }

    /// Skips `amount` bytes.
    pub fn skip(&mut self, amount: usize) -> Result<(), MessageError> {
        self.ensure(amount)?;
        self.buf.advance(amount);
        Ok(())
    }

    /// Fails unless exactly `expected` bytes are left.
    pub fn expect_remaining(&self, expected: usize) -> Result<(), MessageError> {
        let actual = self.remaining();
        if actual != expected {
            return Err(MessageError::UnexpectedLength { expected, actual });
        }

        Ok(())
    }
}

/// Appends values to a growable buffer.
#[derive(Debug, Clone, Default)]
pub struct MessageWriter {
    buf: BytesMut,
}

impl MessageWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Writes a `u8`.
    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    /// Writes a little endian `u16`.
    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16_le(v);
    }

    /// Writes a big endian `u16`.
    pub fn write_u16_be(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    /// Writes a little endian `u32`.
    pub fn write_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    /// Writes a little endian `u64`.
    pub fn write_u64(&mut self, v: u64) {
        self.buf.put_u64_le(v);
    }

    /// Writes a little endian `f32`.
    pub fn write_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, v: &[u8]) {
        self.buf.put_slice(v);
    }

    /// Writes the string followed by a NUL terminator.
    pub fn write_cstring(&mut self, v: &str) {
        self.buf.put_slice(v.as_bytes());
        self.buf.put_u8(0);
    }

    /// Length in bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// `true` when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the writer and returns the bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}
