//! Byte-level building blocks for authticket payloads.
//!
//! A ticket's plaintext is a flat sequence of fixed-width fields. This
//! crate provides the two halves of that format:
//!
//! - **[`ByteWriter`]** — an append-only buffer sized up front to the exact
//!   payload length. Every write advances a cursor; [`ByteWriter::finish`]
//!   refuses to hand back a buffer that was not filled completely.
//! - **[`ByteReader`]** — a cursor over a borrowed slice. Every read checks
//!   that enough bytes remain, and marker reads ([`ByteReader::assert_byte`])
//!   fail loudly instead of silently misparsing.
//!
//! # Encoding rules
//!
//! | Primitive | Encoding |
//! |-----------|----------|
//! | byte      | 1 byte |
//! | bool      | 1 byte, `0x00` or `0x01` |
//! | date      | 8 bytes, big-endian `i64` milliseconds since the Unix epoch |
//! | string    | 2-byte big-endian length, then that many UTF-8 bytes |
//!
//! ```text
//! Codec (ticket layout) → Wire (this crate) → raw bytes
//! ```

mod error;
mod reader;
mod types;
mod writer;

pub use error::WireError;
pub use reader::ByteReader;
pub use types::Timestamp;
pub use writer::{ByteWriter, MAX_STRING_LEN, string_size};

/// Width of an encoded date, in bytes.
pub const DATE_LEN: usize = 8;

/// Width of a string length prefix, in bytes.
pub const STRING_PREFIX_LEN: usize = 2;
