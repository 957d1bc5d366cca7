//! Cursor-based reader over a borrowed byte slice.
//!
//! The mirror image of [`ByteWriter`](crate::ByteWriter): same widths, same
//! byte order. Every method either consumes exactly its field width and
//! advances the cursor, or returns a [`WireError`] and leaves the cursor
//! where it was. Nothing here panics on short or hostile input.

use crate::{DATE_LEN, STRING_PREFIX_LEN, Timestamp, WireError};

/// Reads fixed-width fields from a payload.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Wraps `buf` with the cursor at offset 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Advances past `n` bytes without looking at them.
    pub fn skip(&mut self, n: usize) -> Result<(), WireError> {
        self.take(n).map(|_| ())
    }

    /// Reads one unsigned byte.
    pub fn read_byte(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    /// Reads a boolean. Only `0x00` and `0x01` are accepted.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        match self.peek_byte()? {
            0 => {
                self.pos += 1;
                Ok(false)
            }
            1 => {
                self.pos += 1;
                Ok(true)
            }
            other => Err(WireError::InvalidBool(other)),
        }
    }

    /// Reads a big-endian `i64` millisecond timestamp.
    pub fn read_date(&mut self) -> Result<Timestamp, WireError> {
        let bytes: [u8; DATE_LEN] = self
            .take(DATE_LEN)?
            .try_into()
            .map_err(|_| WireError::Truncated {
                needed: DATE_LEN,
                remaining: 0,
            })?;
        Ok(Timestamp::from_millis(i64::from_be_bytes(bytes)))
    }

    /// Reads a length-prefixed UTF-8 string.
    ///
    /// The cursor only moves if both the prefix and the full body are
    /// present and the body is valid UTF-8.
    pub fn read_string(&mut self) -> Result<String, WireError> {
        let start = self.pos;
        let result = self.read_string_inner();
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn read_string_inner(&mut self) -> Result<String, WireError> {
        let prefix = self.take(STRING_PREFIX_LEN)?;
        let len = usize::from(u16::from_be_bytes([prefix[0], prefix[1]]));
        let body = self.take(len)?;
        std::str::from_utf8(body)
            .map(str::to_owned)
            .map_err(|_| WireError::InvalidUtf8)
    }

    /// Reads one byte and checks it equals `expected`.
    ///
    /// `label` names the marker in the error ("format version", "spacer",
    /// "footer") so a log line says which part of the structure broke.
    pub fn assert_byte(&mut self, expected: u8, label: &'static str) -> Result<(), WireError> {
        let found = self.peek_byte()?;
        if found != expected {
            return Err(WireError::MarkerMismatch {
                label,
                expected,
                found,
            });
        }
        self.pos += 1;
        Ok(())
    }

    /// Succeeds only if every byte has been consumed.
    pub fn ensure_consumed(&self) -> Result<(), WireError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(WireError::TrailingBytes(n)),
        }
    }

    fn peek_byte(&self) -> Result<u8, WireError> {
        self.buf.get(self.pos).copied().ok_or(WireError::Truncated {
            needed: 1,
            remaining: 0,
        })
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(WireError::Truncated {
                needed: n,
                remaining,
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }
}
