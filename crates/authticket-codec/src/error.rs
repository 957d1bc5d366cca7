//! Error types for the ticket codec.
//!
//! Three audiences, three types:
//!
//! - [`ConfigError`] — the codec could not be built. Fatal, reported once
//!   at startup.
//! - [`TicketError`] — one `generate` call was given input it cannot encode.
//!   Fatal to that call only.
//! - `Rejection` (crate-private) — why a ticket failed validation. Logged,
//!   then collapsed into `None` so callers cannot tell a forged ticket from
//!   an expired or truncated one.

use authticket_wire::{Timestamp, WireError};

/// Low-level cryptographic failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// A key or IV had the wrong length for its algorithm.
    #[error("invalid key or IV length")]
    KeyLength,

    /// Ciphertext length is not a whole number of cipher blocks.
    #[error("ciphertext length {0} is not a multiple of the block size")]
    CiphertextLength(usize),

    /// PKCS#7 padding was malformed after decryption.
    #[error("invalid padding")]
    Padding,
}

/// Errors raised while resolving a [`TicketConfig`](crate::TicketConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A key or IV field was not valid hex.
    #[error("{field} is not valid hex: {source}")]
    InvalidHex {
        field: &'static str,
        source: hex::FromHexError,
    },

    /// A key or IV decoded to the wrong number of bytes.
    #[error("{field} must be {expected} bytes, got {actual}")]
    KeyLength {
        field: &'static str,
        expected: String,
        actual: usize,
    },

    /// The random header length is outside the supported range.
    #[error("header length {0} out of range (1..=256)")]
    HeaderLength(usize),

    /// The default cookie path cannot fit in a length-prefixed string.
    #[error("default cookie path is {0} bytes, too long to encode")]
    CookiePathTooLong(usize),

    /// The default ticket lifetime does not fit in a millisecond timestamp.
    #[error("default ttl of {0} seconds is out of range")]
    TtlOutOfRange(u64),

    /// The configuration document could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by [`TicketCodec::generate`](crate::TicketCodec::generate).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketError {
    /// The caller asked for a ticket version that contradicts the version
    /// the configuration pins.
    #[error("ticket version {requested} conflicts with required version {required}")]
    VersionConflict { required: u8, requested: u8 },

    /// The ticket has no subject name.
    #[error("ticket name must not be empty")]
    EmptyName,

    /// Issue date plus default lifetime overflowed.
    #[error("expiration date overflows")]
    DateOverflow,

    /// The payload could not be laid out (e.g. a string is too long).
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Encryption or signing failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Why a ticket was turned away. Never leaves the crate.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Rejection {
    #[error("input is not valid hex")]
    Hex,

    #[error("input of {len} bytes is shorter than the minimum {min}")]
    TooShort { len: usize, min: usize },

    #[error("signature mismatch")]
    BadSignature,

    #[error("decryption failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("malformed payload: {0}")]
    Malformed(#[from] WireError),

    #[error("ticket expired at {expired_at} (now {now})")]
    Expired { expired_at: Timestamp, now: Timestamp },
}
