//! Error types for the wire layer.
//!
//! Writer errors mean the caller planned the buffer wrong (a bug or a
//! bad input string). Reader errors mean the bytes are not a payload we
//! produced: truncated, corrupted, or from a different format version.

/// Errors produced by [`ByteWriter`](crate::ByteWriter) and
/// [`ByteReader`](crate::ByteReader).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// A write would run past the pre-sized buffer.
    #[error("write of {needed} bytes overflows buffer ({remaining} left)")]
    Overflow { needed: usize, remaining: usize },

    /// [`ByteWriter::finish`](crate::ByteWriter::finish) was called before
    /// the buffer was completely filled.
    #[error("buffer underfilled: wrote {written} of {capacity} bytes")]
    Underfilled { written: usize, capacity: usize },

    /// A read needed more bytes than the input has left.
    #[error("truncated input: needed {needed} bytes, {remaining} left")]
    Truncated { needed: usize, remaining: usize },

    /// A marker byte did not have the expected value.
    #[error("bad {label} marker: expected {expected:#04x}, found {found:#04x}")]
    MarkerMismatch {
        label: &'static str,
        expected: u8,
        found: u8,
    },

    /// A boolean field held something other than 0 or 1.
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    /// A string field was not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// A string is too long for the 16-bit length prefix.
    #[error("string of {0} bytes exceeds the length prefix range")]
    StringTooLong(usize),

    /// Bytes were left over after the last expected field.
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
}
