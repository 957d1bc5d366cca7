//! # authticket
//!
//! Stateless, tamper-evident authentication tickets.
//!
//! A ticket is issued once at login and handed to the client, typically as
//! a cookie value. On every later request the server validates it and gets
//! the original identity back, with no session store involved. Tickets are
//! AES-CBC encrypted, HMAC signed over the ciphertext, and carry their own
//! expiration date.
//!
//! ## Quick Start
//!
//! ```rust
//! use authticket::prelude::*;
//!
//! let codec = TicketCodecBuilder::new()
//!     .signature(SignatureAlgorithm::HmacSha256, "ab".repeat(32))
//!     .cipher(CipherAlgorithm::Aes256Cbc, "cd".repeat(32), "ef".repeat(16))
//!     .build()?;
//!
//! let cookie = codec.generate(&TicketParams::new("alice").with_custom_data("admin"))?;
//!
//! match codec.validate(&cookie) {
//!     Some(ticket) => assert_eq!(ticket.custom_data, "admin"),
//!     None => unreachable!("a fresh ticket validates"),
//! }
//! # Ok::<(), AuthTicketError>(())
//! ```
//!
//! ## Crates
//!
//! | Crate | Role |
//! |-------|------|
//! | `authticket-wire` | byte reader/writer primitives |
//! | `authticket-codec` | payload layout, crypto, config |
//! | `authticket` (this) | builder, unified error, logging setup |

mod builder;
mod error;

pub use authticket_codec::*;
pub use authticket_wire::{ByteReader, ByteWriter, WireError};
pub use builder::TicketCodecBuilder;
pub use error::AuthTicketError;

/// Everything needed to issue and check tickets.
pub mod prelude {
    pub use crate::{
        AuthTicketError, CipherAlgorithm, Encoded, OutputEncoding, SignatureAlgorithm, Ticket,
        TicketCodec, TicketCodecBuilder, TicketConfig, TicketParams, Timestamp,
    };
}

/// Installs a `tracing` subscriber that honors `RUST_LOG`.
///
/// Defaults to `info` when `RUST_LOG` is unset. Safe to call more than
/// once; later calls are ignored.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
