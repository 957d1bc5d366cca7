//! Tamper-evident authentication tickets.
//!
//! A ticket carries a user's identity and session metadata inside an
//! encrypted, signed blob, so the server can hand it to a client (usually
//! as a cookie) and later trust what comes back without storing anything.
//!
//! 1. **Configure once** — [`TicketConfig`] → [`ResolvedConfig`] decodes
//!    and checks keys up front.
//! 2. **Generate** — [`TicketCodec::generate`] lays out the payload,
//!    encrypts it, and signs the ciphertext.
//! 3. **Validate** — [`TicketCodec::validate`] checks the signature, then
//!    decrypts, parses, and applies the expiration policy. Any failure is
//!    just `None`.
//!
//! # How it fits in the stack
//!
//! ```text
//! HTTP / cookie layer (caller)  ← moves hex strings in and out of cookies
//!     ↕
//! Codec (this crate)            ← payload layout, encryption, signature
//!     ↕
//! Wire (authticket-wire)        ← fixed-width byte reader/writer
//! ```

mod codec;
mod config;
mod crypto;
mod error;
mod ticket;

pub use authticket_wire::Timestamp;
pub use codec::{
    DEFAULT_TICKET_VERSION, FIXED_OVERHEAD, FOOTER, FORMAT_VERSION, SPACER, TicketCodec,
};
pub use config::{
    CipherAlgorithm, OutputEncoding, ResolvedConfig, SignatureAlgorithm, TicketConfig,
};
pub use error::{ConfigError, CryptoError, TicketError};
pub use ticket::{Encoded, Ticket, TicketParams};
