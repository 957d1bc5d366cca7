//! Ticket types: what goes into a ticket and what comes back out.
//!
//! - [`TicketParams`] — input to `generate`. Only `name` is required;
//!   everything else falls back to the codec's configured defaults.
//! - [`Ticket`] — a fully populated ticket. Returned by a successful
//!   `validate`, never partially filled.
//! - [`Encoded`] — the sealed output, hex text or raw bytes.

use std::fmt;
use std::time::Duration;

use authticket_wire::Timestamp;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// The identity and session data carried inside a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    /// Application-defined version number.
    pub version: u8,

    pub issue_date: Timestamp,

    /// After this instant the ticket is rejected (when expiration is
    /// enforced).
    pub expiration_date: Timestamp,

    /// Whether the cookie carrying this ticket should outlive the
    /// browser session.
    pub is_persistent: bool,

    /// The authenticated subject.
    pub name: String,

    /// Opaque application payload.
    pub custom_data: String,

    pub cookie_path: String,
}

impl Ticket {
    /// `true` once `now` is strictly past the expiration date.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expiration_date < now
    }

    /// Time between issue and expiration. Zero if the dates are inverted.
    pub fn lifetime(&self) -> Duration {
        self.expiration_date
            .duration_since(self.issue_date)
            .unwrap_or(Duration::ZERO)
    }

    /// `true` when at least half of the lifetime has elapsed at `now`,
    /// i.e. the time already used is no less than the time remaining.
    pub fn needs_renewal_at(&self, now: Timestamp) -> bool {
        let elapsed = now.as_millis().saturating_sub(self.issue_date.as_millis());
        let remaining = self.expiration_date.as_millis().saturating_sub(now.as_millis());
        elapsed >= remaining
    }

    /// Parameters that would re-issue this ticket with identical fields.
    pub fn to_params(&self) -> TicketParams {
        TicketParams {
            name: self.name.clone(),
            version: Some(self.version),
            issue_date: Some(self.issue_date),
            expiration_date: Some(self.expiration_date),
            is_persistent: Some(self.is_persistent),
            custom_data: Some(self.custom_data.clone()),
            cookie_path: Some(self.cookie_path.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// TicketParams
// ---------------------------------------------------------------------------

/// Input to [`TicketCodec::generate`](crate::TicketCodec::generate).
///
/// `None` fields are filled from configuration at generation time:
///
/// | Field | Default |
/// |-------|---------|
/// | `version` | required version if pinned, else 1 |
/// | `issue_date` | now |
/// | `expiration_date` | issue date + default ttl |
/// | `is_persistent` | configured default |
/// | `custom_data` | empty string |
/// | `cookie_path` | configured default |
///
/// ```rust
/// use authticket_codec::TicketParams;
///
/// let params = TicketParams::new("alice")
///     .with_custom_data("{}")
///     .with_persistent(true);
/// assert_eq!(params.name, "alice");
/// assert_eq!(params.version, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketParams {
    pub name: String,
    pub version: Option<u8>,
    pub issue_date: Option<Timestamp>,
    pub expiration_date: Option<Timestamp>,
    pub is_persistent: Option<bool>,
    pub custom_data: Option<String>,
    pub cookie_path: Option<String>,
}

impl TicketParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_issue_date(mut self, date: Timestamp) -> Self {
        self.issue_date = Some(date);
        self
    }

    pub fn with_expiration_date(mut self, date: Timestamp) -> Self {
        self.expiration_date = Some(date);
        self
    }

    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.is_persistent = Some(persistent);
        self
    }

    pub fn with_custom_data(mut self, data: impl Into<String>) -> Self {
        self.custom_data = Some(data.into());
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = Some(path.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Encoded
// ---------------------------------------------------------------------------

/// A sealed ticket: `ciphertext || signature`, in the configured encoding.
///
/// Implements `AsRef<[u8]>` so it can be passed straight back to
/// [`TicketCodec::validate`](crate::TicketCodec::validate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    /// Upper-case hex text.
    Hex(String),
    Raw(Vec<u8>),
}

impl Encoded {
    /// Length of the encoded form (hex characters or raw bytes).
    pub fn len(&self) -> usize {
        self.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The hex text, if this is hex output.
    pub fn as_hex(&self) -> Option<&str> {
        match self {
            Self::Hex(s) => Some(s),
            Self::Raw(_) => None,
        }
    }

    /// Consumes the value, returning its bytes (hex text as ASCII bytes).
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Hex(s) => s.into_bytes(),
            Self::Raw(b) => b,
        }
    }
}

impl AsRef<[u8]> for Encoded {
    fn as_ref(&self) -> &[u8] {
        match self {
            Self::Hex(s) => s.as_bytes(),
            Self::Raw(b) => b,
        }
    }
}

/// Hex output prints as-is; raw output prints hex-encoded.
impl fmt::Display for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hex(s) => f.write_str(s),
            Self::Raw(b) => f.write_str(&hex::encode_upper(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(issue: i64, expire: i64) -> Ticket {
        Ticket {
            version: 1,
            issue_date: Timestamp::from_millis(issue),
            expiration_date: Timestamp::from_millis(expire),
            is_persistent: false,
            name: "alice".into(),
            custom_data: String::new(),
            cookie_path: "/".into(),
        }
    }

    #[test]
    fn test_is_expired_at_boundary_is_still_valid() {
        let t = ticket(0, 1_000);
        assert!(!t.is_expired_at(Timestamp::from_millis(999)));
        assert!(!t.is_expired_at(Timestamp::from_millis(1_000)));
        assert!(t.is_expired_at(Timestamp::from_millis(1_001)));
    }

    #[test]
    fn test_lifetime_inverted_dates_is_zero() {
        assert_eq!(ticket(0, 60_000).lifetime(), Duration::from_secs(60));
        assert_eq!(ticket(5_000, 0).lifetime(), Duration::ZERO);
    }

    #[test]
    fn test_needs_renewal_at_half_life() {
        let t = ticket(0, 1_000);
        assert!(!t.needs_renewal_at(Timestamp::from_millis(100)));
        assert!(!t.needs_renewal_at(Timestamp::from_millis(499)));
        assert!(t.needs_renewal_at(Timestamp::from_millis(500)));
        assert!(t.needs_renewal_at(Timestamp::from_millis(2_000)));
    }

    #[test]
    fn test_to_params_preserves_every_field() {
        let t = ticket(10, 20);
        let p = t.to_params();
        assert_eq!(p.name, "alice");
        assert_eq!(p.version, Some(1));
        assert_eq!(p.issue_date, Some(Timestamp::from_millis(10)));
        assert_eq!(p.expiration_date, Some(Timestamp::from_millis(20)));
        assert_eq!(p.is_persistent, Some(false));
        assert_eq!(p.custom_data.as_deref(), Some(""));
        assert_eq!(p.cookie_path.as_deref(), Some("/"));
    }

    #[test]
    fn test_params_builder_sets_fields() {
        let p = TicketParams::new("bob")
            .with_version(4)
            .with_cookie_path("/app")
            .with_persistent(true);
        assert_eq!(p.version, Some(4));
        assert_eq!(p.cookie_path.as_deref(), Some("/app"));
        assert_eq!(p.is_persistent, Some(true));
        assert_eq!(p.custom_data, None);
    }

    #[test]
    fn test_encoded_display_and_bytes() {
        let raw = Encoded::Raw(vec![0xAB, 0x01]);
        assert_eq!(raw.to_string(), "AB01");
        assert_eq!(raw.as_hex(), None);
        assert_eq!(raw.len(), 2);

        let text = Encoded::Hex("AB01".into());
        assert_eq!(text.as_hex(), Some("AB01"));
        assert_eq!(text.as_ref(), b"AB01");
        assert_eq!(text.into_bytes(), b"AB01".to_vec());
    }

    #[test]
    fn test_ticket_serializes_dates_as_millis() {
        let json = serde_json::to_value(ticket(1, 2)).unwrap();
        assert_eq!(json["issue_date"], 1);
        assert_eq!(json["expiration_date"], 2);
        assert_eq!(json["name"], "alice");
    }
}
