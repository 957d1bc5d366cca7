//! Append-only, pre-sized byte buffer.
//!
//! The caller computes the payload size before writing anything (see
//! [`string_size`]), allocates a writer of exactly that capacity, and then
//! fills it front to back. Writing past the end, or finishing early, is a
//! [`WireError`]. A size mismatch always means the size arithmetic and the
//! write sequence disagree, and we want that caught before any bytes leave
//! the process.

use crate::{STRING_PREFIX_LEN, Timestamp, WireError};

/// The longest string (in UTF-8 bytes) a 16-bit length prefix can describe.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Returns the number of bytes [`ByteWriter::write_string`] will consume
/// for `s`: the length prefix plus the UTF-8 bytes.
///
/// Pure arithmetic; does not check [`MAX_STRING_LEN`]. An over-long string
/// is reported when it is actually written.
pub fn string_size(s: &str) -> usize {
    STRING_PREFIX_LEN + s.len()
}

/// Builds a payload into a buffer of fixed, known-in-advance length.
#[derive(Debug)]
pub struct ByteWriter {
    /// Zero-initialized to full capacity; `pos` marks how much is written.
    buf: Vec<u8>,
    pos: usize,
}

impl ByteWriter {
    /// Creates a writer that must be filled with exactly `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            pos: 0,
        }
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes still to be written before the buffer is full.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Copies `bytes` verbatim at the cursor.
    pub fn write_buffer(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let dst = self.claim(bytes.len())?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    /// Writes one unsigned byte.
    pub fn write_byte(&mut self, n: u8) -> Result<(), WireError> {
        self.write_buffer(&[n])
    }

    /// Writes `0x01` for `true`, `0x00` for `false`.
    pub fn write_bool(&mut self, b: bool) -> Result<(), WireError> {
        self.write_byte(u8::from(b))
    }

    /// Writes a timestamp as a big-endian `i64` millisecond count.
    pub fn write_date(&mut self, date: Timestamp) -> Result<(), WireError> {
        self.write_buffer(&date.as_millis().to_be_bytes())
    }

    /// Writes a 2-byte big-endian length followed by the UTF-8 bytes of `s`.
    ///
    /// # Errors
    /// [`WireError::StringTooLong`] if `s` exceeds [`MAX_STRING_LEN`] bytes.
    /// Nothing is written in that case.
    pub fn write_string(&mut self, s: &str) -> Result<(), WireError> {
        let len = u16::try_from(s.len()).map_err(|_| WireError::StringTooLong(s.len()))?;
        // Claim the whole string up front so a too-small buffer never ends
        // up holding a prefix without its body.
        let dst = self.claim(string_size(s))?;
        let (prefix, body) = dst.split_at_mut(STRING_PREFIX_LEN);
        prefix.copy_from_slice(&len.to_be_bytes());
        body.copy_from_slice(s.as_bytes());
        Ok(())
    }

    /// Returns the finished buffer.
    ///
    /// # Errors
    /// [`WireError::Underfilled`] if fewer bytes were written than the
    /// capacity the writer was created with.
    pub fn finish(self) -> Result<Vec<u8>, WireError> {
        if self.pos != self.buf.len() {
            return Err(WireError::Underfilled {
                written: self.pos,
                capacity: self.buf.len(),
            });
        }
        Ok(self.buf)
    }

    /// Reserves the next `n` bytes and advances the cursor past them.
    fn claim(&mut self, n: usize) -> Result<&mut [u8], WireError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(WireError::Overflow {
                needed: n,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&mut self.buf[start..self.pos])
    }
}
