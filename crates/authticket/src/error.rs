//! Unified error type for authticket.

use authticket_codec::{ConfigError, TicketError};
use authticket_wire::WireError;

/// Top-level error that wraps every crate-specific error.
///
/// Note there is no validation variant: a ticket that fails validation is
/// `None`, not an error.
#[derive(Debug, thiserror::Error)]
pub enum AuthTicketError {
    /// The codec could not be configured (bad key, bad JSON, ...).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A ticket could not be generated.
    #[error(transparent)]
    Ticket(#[from] TicketError),

    /// A byte-level layout error surfaced directly.
    #[error(transparent)]
    Wire(#[from] WireError),
}
