//! The ticket codec: seal tickets on the way out, open them on the way in.
//!
//! # Payload layout
//!
//! ```text
//! ┌──────────┬─────┬─────┬────────┬──────┬────────────┬──────┬──────┬────────┬──────┬──────┐
//! │ header   │ fmt │ ver │ issued │ 0xFE │ expiration │ pers │ name │ custom │ path │ 0xFF │
//! │ (random) │ 0x01│ u8  │ i64 ms │      │ i64 ms     │ 0/1  │ str  │ str    │ str  │      │
//! └──────────┴─────┴─────┴────────┴──────┴────────────┴──────┴──────┴────────┴──────┴──────┘
//! ```
//!
//! Strings are a big-endian `u16` byte length followed by UTF-8.
//!
//! # Sealing
//!
//! ```text
//! plaintext ──encrypt──→ ciphertext ──sign──→ ciphertext || tag ──→ hex / raw
//! ```
//!
//! The tag covers the ciphertext, and opening checks it before decrypting
//! anything. A forged or altered ticket therefore never reaches the cipher
//! or the parser.

use authticket_wire::{
    ByteReader, ByteWriter, DATE_LEN, STRING_PREFIX_LEN, Timestamp, string_size,
};
use rand::RngCore;

use crate::crypto;
use crate::error::Rejection;
use crate::{
    ConfigError, Encoded, OutputEncoding, ResolvedConfig, Ticket, TicketConfig, TicketError,
    TicketParams,
};

/// Payload format marker. Bumped only if the byte layout changes.
pub const FORMAT_VERSION: u8 = 0x01;

/// Marker between the issue and expiration dates.
pub const SPACER: u8 = 0xFE;

/// Last byte of every payload.
pub const FOOTER: u8 = 0xFF;

/// Ticket version used when neither the caller nor the config sets one.
pub const DEFAULT_TICKET_VERSION: u8 = 1;

/// Bytes of every payload outside the random header and the three string
/// bodies: format, version, issue date, spacer, expiration, persistent
/// flag, footer.
pub const FIXED_OVERHEAD: usize = 1 + 1 + DATE_LEN + 1 + DATE_LEN + 1 + 1;

/// Smallest possible payload past the header: fixed fields plus three
/// empty strings.
const MIN_BODY_LEN: usize = FIXED_OVERHEAD + 3 * STRING_PREFIX_LEN;

/// Issues and validates authentication tickets.
///
/// Holds nothing but its [`ResolvedConfig`], so a single codec can be
/// wrapped in an `Arc` and used from any number of threads at once.
///
/// ```rust
/// use authticket_codec::{TicketCodec, TicketConfig, TicketParams};
///
/// let codec = TicketCodec::from_config(&TicketConfig {
///     signature_key: "11".repeat(32),
///     cipher_key: "22".repeat(32),
///     cipher_iv: "33".repeat(16),
///     ..TicketConfig::default()
/// })
/// .unwrap();
///
/// let cookie = codec.generate(&TicketParams::new("alice")).unwrap();
/// let ticket = codec.validate(&cookie).expect("fresh ticket is valid");
/// assert_eq!(ticket.name, "alice");
/// assert_eq!(ticket.cookie_path, "/");
/// ```
#[derive(Debug, Clone)]
pub struct TicketCodec {
    config: ResolvedConfig,
}

impl TicketCodec {
    /// Wraps an already-resolved configuration.
    pub fn new(config: ResolvedConfig) -> Self {
        tracing::info!(
            signature = %config.signature_algorithm(),
            cipher = %config.cipher_algorithm(),
            header_len = config.header_len(),
            output = ?config.output(),
            "ticket codec ready"
        );
        Self { config }
    }

    /// Resolves `config` and builds a codec from it.
    pub fn from_config(config: &TicketConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.resolve()?))
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    // =====================================================================
    // Generation
    // =====================================================================

    /// Seals a new ticket.
    ///
    /// # Errors
    /// - [`TicketError::EmptyName`] — `params.name` is empty
    /// - [`TicketError::VersionConflict`] — `params.version` contradicts the
    ///   configured required version
    /// - [`TicketError::Wire`] — a string field is too long to encode
    pub fn generate(&self, params: &TicketParams) -> Result<Encoded, TicketError> {
        let mut header = vec![0u8; self.config.header_len()];
        rand::rng().fill_bytes(&mut header);
        self.generate_with_header(params, &header)
    }

    /// [`generate`](Self::generate) with a caller-chosen header. Lets tests
    /// pin the otherwise random salt.
    pub(crate) fn generate_with_header(
        &self,
        params: &TicketParams,
        header: &[u8],
    ) -> Result<Encoded, TicketError> {
        let ticket = self.fill_defaults(params, Timestamp::now())?;
        let plaintext = self.serialize(&ticket, header)?;

        let cfg = &self.config;
        let mut sealed = crypto::encrypt(
            cfg.cipher_algorithm(),
            cfg.cipher_key(),
            cfg.cipher_iv(),
            &plaintext,
        )?;
        let signature = crypto::sign(cfg.signature_algorithm(), cfg.signature_key(), &sealed)?;
        sealed.extend_from_slice(&signature);

        tracing::trace!(name = %ticket.name, len = sealed.len(), "ticket generated");

        Ok(match cfg.output() {
            OutputEncoding::Hex => Encoded::Hex(hex::encode_upper(sealed)),
            OutputEncoding::Raw => Encoded::Raw(sealed),
        })
    }

    /// Exact plaintext size for `ticket`, header included.
    pub fn payload_size(&self, ticket: &Ticket) -> usize {
        self.config.header_len()
            + FIXED_OVERHEAD
            + string_size(&ticket.name)
            + string_size(&ticket.custom_data)
            + string_size(&ticket.cookie_path)
    }

    /// Turns caller input into a complete ticket using configured defaults.
    fn fill_defaults(&self, params: &TicketParams, now: Timestamp) -> Result<Ticket, TicketError> {
        if params.name.is_empty() {
            return Err(TicketError::EmptyName);
        }

        let version = match (self.config.required_version(), params.version) {
            (Some(required), Some(requested)) if requested != required => {
                return Err(TicketError::VersionConflict {
                    required,
                    requested,
                });
            }
            (Some(required), _) => required,
            (None, requested) => requested.unwrap_or(DEFAULT_TICKET_VERSION),
        };

        let issue_date = params.issue_date.unwrap_or(now);
        let expiration_date = match params.expiration_date {
            Some(date) => date,
            None => issue_date
                .checked_add(self.config.default_ttl())
                .ok_or(TicketError::DateOverflow)?,
        };

        Ok(Ticket {
            version,
            issue_date,
            expiration_date,
            is_persistent: params
                .is_persistent
                .unwrap_or(self.config.default_persistent()),
            name: params.name.clone(),
            custom_data: params.custom_data.clone().unwrap_or_default(),
            cookie_path: params
                .cookie_path
                .clone()
                .unwrap_or_else(|| self.config.default_cookie_path().to_owned()),
        })
    }

    fn serialize(&self, ticket: &Ticket, header: &[u8]) -> Result<Vec<u8>, TicketError> {
        let mut w = ByteWriter::with_capacity(self.payload_size(ticket));
        w.write_buffer(header)?;
        w.write_byte(FORMAT_VERSION)?;
        w.write_byte(ticket.version)?;
        w.write_date(ticket.issue_date)?;
        w.write_byte(SPACER)?;
        w.write_date(ticket.expiration_date)?;
        w.write_bool(ticket.is_persistent)?;
        w.write_string(&ticket.name)?;
        w.write_string(&ticket.custom_data)?;
        w.write_string(&ticket.cookie_path)?;
        w.write_byte(FOOTER)?;
        Ok(w.finish()?)
    }

    // =====================================================================
    // Validation
    // =====================================================================

    /// Opens and checks a ticket against the current time.
    ///
    /// Returns `None` for anything that is not a genuine, intact, unexpired
    /// ticket. The reason is logged at `debug` level and otherwise hidden.
    pub fn validate(&self, input: impl AsRef<[u8]>) -> Option<Ticket> {
        self.validate_at(input, Timestamp::now())
    }

    /// [`validate`](Self::validate) against an explicit clock reading.
    pub fn validate_at(&self, input: impl AsRef<[u8]>, now: Timestamp) -> Option<Ticket> {
        match self.open(input.as_ref(), now) {
            Ok(ticket) => {
                tracing::trace!(name = %ticket.name, "ticket accepted");
                Some(ticket)
            }
            Err(reason) => {
                tracing::debug!(%reason, "ticket rejected");
                None
            }
        }
    }

    /// Smallest decoded input (ciphertext + tag) that could hold a ticket.
    pub fn min_sealed_len(&self) -> usize {
        crypto::ciphertext_len(self.config.header_len() + MIN_BODY_LEN)
            + self.config.signature_len()
    }

    fn open(&self, input: &[u8], now: Timestamp) -> Result<Ticket, Rejection> {
        let cfg = &self.config;

        let decoded;
        let sealed = match cfg.output() {
            OutputEncoding::Hex => {
                decoded = hex::decode(input).map_err(|_| Rejection::Hex)?;
                decoded.as_slice()
            }
            OutputEncoding::Raw => input,
        };

        let min = self.min_sealed_len();
        if sealed.len() < min {
            return Err(Rejection::TooShort {
                len: sealed.len(),
                min,
            });
        }

        let (ciphertext, signature) = sealed.split_at(sealed.len() - cfg.signature_len());
        if !crypto::verify(
            cfg.signature_algorithm(),
            cfg.signature_key(),
            ciphertext,
            signature,
        )? {
            return Err(Rejection::BadSignature);
        }

        let plaintext = crypto::decrypt(
            cfg.cipher_algorithm(),
            cfg.cipher_key(),
            cfg.cipher_iv(),
            ciphertext,
        )?;
        let ticket = self.deserialize(&plaintext)?;

        if cfg.enforce_expiration() && ticket.is_expired_at(now) {
            return Err(Rejection::Expired {
                expired_at: ticket.expiration_date,
                now,
            });
        }
        Ok(ticket)
    }

    fn deserialize(&self, plaintext: &[u8]) -> Result<Ticket, Rejection> {
        let mut r = ByteReader::new(plaintext);
        r.skip(self.config.header_len())?;
        r.assert_byte(FORMAT_VERSION, "format version")?;

        let version = match self.config.required_version() {
            Some(required) => {
                r.assert_byte(required, "ticket version")?;
                required
            }
            None => r.read_byte()?,
        };

        let issue_date = r.read_date()?;
        r.assert_byte(SPACER, "spacer")?;
        let expiration_date = r.read_date()?;
        let is_persistent = r.read_bool()?;
        let name = r.read_string()?;
        let custom_data = r.read_string()?;
        let cookie_path = r.read_string()?;
        r.assert_byte(FOOTER, "footer")?;
        r.ensure_consumed()?;

        Ok(Ticket {
            version,
            issue_date,
            expiration_date,
            is_persistent,
            name,
            custom_data,
            cookie_path,
        })
    }

    // =====================================================================
    // Sliding expiration
    // =====================================================================

    /// Re-issues `ticket` if sliding expiration is on and the ticket is
    /// past half its lifetime.
    ///
    /// The new ticket keeps every field except the dates: it is issued now
    /// and expires one original lifetime from now. Returns `Ok(None)` when
    /// no renewal is due.
    pub fn refresh(&self, ticket: &Ticket) -> Result<Option<Encoded>, TicketError> {
        self.refresh_at(ticket, Timestamp::now())
    }

    /// [`refresh`](Self::refresh) against an explicit clock reading.
    pub fn refresh_at(
        &self,
        ticket: &Ticket,
        now: Timestamp,
    ) -> Result<Option<Encoded>, TicketError> {
        if !self.config.sliding_expiration() || !ticket.needs_renewal_at(now) {
            return Ok(None);
        }
        let expiration = now
            .checked_add(ticket.lifetime())
            .ok_or(TicketError::DateOverflow)?;
        let params = TicketParams {
            issue_date: Some(now),
            expiration_date: Some(expiration),
            ..ticket.to_params()
        };
        tracing::debug!(name = %ticket.name, "renewing ticket");
        self.generate(&params).map(Some)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the codec internals.
    //!
    //! These reach into private pieces (fixed headers, rejection reasons)
    //! that the public API deliberately hides. Black-box behavior lives in
    //! `tests/ticket_codec.rs`.

    use super::*;
    use crate::{CipherAlgorithm, SignatureAlgorithm};

    // -- Helpers ----------------------------------------------------------

    fn config() -> TicketConfig {
        TicketConfig {
            signature_key: "a5".repeat(32),
            cipher_key: "5a".repeat(32),
            cipher_iv: "0f".repeat(16),
            output: OutputEncoding::Raw,
            ..TicketConfig::default()
        }
    }

    fn codec() -> TicketCodec {
        TicketCodec::from_config(&config()).expect("valid config")
    }

    fn params_at(issue: i64) -> TicketParams {
        TicketParams::new("alice")
            .with_custom_data("{}")
            .with_version(1)
            .with_issue_date(Timestamp::from_millis(issue))
            .with_expiration_date(Timestamp::from_millis(issue + 3_600_000))
            .with_persistent(false)
    }

    /// Decrypts a raw sealed ticket without verifying the tag, to look at
    /// the plaintext the codec produced.
    fn peek_plaintext(codec: &TicketCodec, sealed: &[u8]) -> Vec<u8> {
        let cfg = codec.config();
        let ct = &sealed[..sealed.len() - cfg.signature_len()];
        crypto::decrypt(cfg.cipher_algorithm(), cfg.cipher_key(), cfg.cipher_iv(), ct).unwrap()
    }

    /// Re-encrypts and re-signs an arbitrary plaintext with the codec's keys,
    /// simulating a ticket minted by something holding the keys but
    /// laying the payload out differently.
    fn seal_raw(codec: &TicketCodec, plaintext: &[u8]) -> Vec<u8> {
        let cfg = codec.config();
        let mut out = crypto::encrypt(
            cfg.cipher_algorithm(),
            cfg.cipher_key(),
            cfg.cipher_iv(),
            plaintext,
        )
        .unwrap();
        let tag = crypto::sign(cfg.signature_algorithm(), cfg.signature_key(), &out).unwrap();
        out.extend_from_slice(&tag);
        out
    }

    // =====================================================================
    // Layout
    // =====================================================================

    #[test]
    fn test_fixed_overhead_is_21_bytes() {
        assert_eq!(FIXED_OVERHEAD, 21);
    }

    #[test]
    fn test_plaintext_layout_matches_documented_offsets() {
        let codec = codec();
        let header = [0xAA; 32];
        let sealed = codec
            .generate_with_header(&params_at(1_000), &header)
            .unwrap()
            .into_bytes();

        let pt = peek_plaintext(&codec, &sealed);

        assert_eq!(&pt[..32], &header);
        assert_eq!(pt[32], FORMAT_VERSION);
        assert_eq!(pt[33], 1, "ticket version");
        assert_eq!(&pt[34..42], &1_000i64.to_be_bytes());
        assert_eq!(pt[42], SPACER);
        assert_eq!(&pt[43..51], &3_601_000i64.to_be_bytes());
        assert_eq!(pt[51], 0, "not persistent");
        assert_eq!(&pt[52..59], b"\x00\x05alice");
        assert_eq!(&pt[59..63], b"\x00\x02{}");
        assert_eq!(&pt[63..66], b"\x00\x01/");
        assert_eq!(pt[66], FOOTER);
        assert_eq!(pt.len(), 67);
    }

    #[test]
    fn test_payload_size_matches_serialized_length() {
        let codec = codec();
        let ticket = codec
            .fill_defaults(&params_at(0).with_cookie_path("/ünï"), Timestamp::EPOCH)
            .unwrap();
        let pt = codec.serialize(&ticket, &[0; 32]).unwrap();
        assert_eq!(pt.len(), codec.payload_size(&ticket));
    }

    // =====================================================================
    // Determinism
    // =====================================================================

    #[test]
    fn test_same_header_same_output() {
        let codec = codec();
        let a = codec.generate_with_header(&params_at(0), &[1; 32]).unwrap();
        let b = codec.generate_with_header(&params_at(0), &[1; 32]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_header_different_output() {
        let codec = codec();
        let a = codec.generate_with_header(&params_at(0), &[1; 32]).unwrap();
        let b = codec.generate_with_header(&params_at(0), &[2; 32]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_uses_random_header() {
        let codec = codec();
        let a = codec.generate(&params_at(0)).unwrap();
        let b = codec.generate(&params_at(0)).unwrap();
        assert_ne!(a, b, "two tickets with identical fields must differ");
    }

    // =====================================================================
    // Defaults
    // =====================================================================

    #[test]
    fn test_fill_defaults_uses_config_values() {
        let codec = TicketCodec::from_config(&TicketConfig {
            default_ttl_secs: 60,
            default_persistent: true,
            default_cookie_path: "/app".into(),
            ..config()
        })
        .unwrap();
        let now = Timestamp::from_millis(5_000);

        let t = codec.fill_defaults(&TicketParams::new("bob"), now).unwrap();

        assert_eq!(t.version, DEFAULT_TICKET_VERSION);
        assert_eq!(t.issue_date, now);
        assert_eq!(t.expiration_date, Timestamp::from_millis(65_000));
        assert!(t.is_persistent);
        assert_eq!(t.custom_data, "");
        assert_eq!(t.cookie_path, "/app");
    }

    #[test]
    fn test_fill_defaults_explicit_false_overrides_persistent_default() {
        let codec = TicketCodec::from_config(&TicketConfig {
            default_persistent: true,
            ..config()
        })
        .unwrap();
        let t = codec
            .fill_defaults(&TicketParams::new("bob").with_persistent(false), Timestamp::EPOCH)
            .unwrap();
        assert!(!t.is_persistent);
    }

    #[test]
    fn test_fill_defaults_pinned_version_applied_when_unset() {
        let codec = TicketCodec::from_config(&TicketConfig {
            required_version: Some(7),
            ..config()
        })
        .unwrap();
        let t = codec
            .fill_defaults(&TicketParams::new("bob"), Timestamp::EPOCH)
            .unwrap();
        assert_eq!(t.version, 7);
    }

    #[test]
    fn test_fill_defaults_expiration_overflow() {
        let codec = codec();
        let params = TicketParams::new("bob").with_issue_date(Timestamp::from_millis(i64::MAX));
        assert_eq!(
            codec.fill_defaults(&params, Timestamp::EPOCH),
            Err(TicketError::DateOverflow)
        );
    }

    // =====================================================================
    // Rejection reasons
    // =====================================================================

    #[test]
    fn test_open_tampered_tag_is_bad_signature() {
        let codec = codec();
        let mut sealed = codec.generate(&params_at(0)).unwrap().into_bytes();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xFF;

        let err = codec.open(&sealed, Timestamp::EPOCH).unwrap_err();
        assert!(matches!(err, Rejection::BadSignature), "{err}");
    }

    #[test]
    fn test_open_short_input_is_too_short() {
        let codec = codec();
        let err = codec.open(&[0; 10], Timestamp::EPOCH).unwrap_err();
        assert!(matches!(err, Rejection::TooShort { len: 10, .. }));
    }

    #[test]
    fn test_open_expired_reports_dates() {
        let codec = codec();
        let sealed = codec.generate(&params_at(0)).unwrap();
        let now = Timestamp::from_millis(3_600_001);

        let err = codec.open(sealed.as_ref(), now).unwrap_err();
        assert!(matches!(err, Rejection::Expired { .. }));
        assert!(err.to_string().contains("3600000ms"));
    }

    #[test]
    fn test_open_bad_format_marker_is_malformed() {
        // Correctly keyed and signed, but the format byte is wrong. This is
        // what a ticket from a future layout would look like.
        let codec = codec();
        let ticket = codec.fill_defaults(&params_at(0), Timestamp::EPOCH).unwrap();
        let mut pt = codec.serialize(&ticket, &[0; 32]).unwrap();
        pt[32] = 0x02;
        let sealed = seal_raw(&codec, &pt);

        let err = codec.open(&sealed, Timestamp::EPOCH).unwrap_err();
        assert!(
            matches!(
                err,
                Rejection::Malformed(authticket_wire::WireError::MarkerMismatch {
                    label: "format version",
                    ..
                })
            ),
            "{err}"
        );
    }

    #[test]
    fn test_open_bad_spacer_and_footer_are_malformed() {
        let codec = codec();
        let ticket = codec.fill_defaults(&params_at(0), Timestamp::EPOCH).unwrap();
        let good = codec.serialize(&ticket, &[0; 32]).unwrap();

        let mut bad_spacer = good.clone();
        bad_spacer[42] = 0x00;
        let mut bad_footer = good.clone();
        let last = bad_footer.len() - 1;
        bad_footer[last] = 0x00;

        for (pt, label) in [(bad_spacer, "spacer"), (bad_footer, "footer")] {
            let err = codec.open(&seal_raw(&codec, &pt), Timestamp::EPOCH).unwrap_err();
            assert!(
                matches!(
                    &err,
                    Rejection::Malformed(authticket_wire::WireError::MarkerMismatch { label: l, .. })
                        if *l == label
                ),
                "{label}: {err}"
            );
        }
    }

    #[test]
    fn test_open_trailing_bytes_is_malformed() {
        let codec = codec();
        let ticket = codec.fill_defaults(&params_at(0), Timestamp::EPOCH).unwrap();
        let mut pt = codec.serialize(&ticket, &[0; 32]).unwrap();
        pt.push(0x00);

        let err = codec.open(&seal_raw(&codec, &pt), Timestamp::EPOCH).unwrap_err();
        assert!(matches!(
            err,
            Rejection::Malformed(authticket_wire::WireError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_open_hex_mode_rejects_non_hex() {
        let codec = TicketCodec::from_config(&TicketConfig {
            output: OutputEncoding::Hex,
            ..config()
        })
        .unwrap();
        let err = codec.open(b"zz-not-hex", Timestamp::EPOCH).unwrap_err();
        assert!(matches!(err, Rejection::Hex));
    }

    #[test]
    fn test_min_sealed_len_for_default_algorithms() {
        // header 32 + body 27 = 59 → 64 bytes of ciphertext, plus 32-byte tag.
        assert_eq!(codec().min_sealed_len(), 96);

        let sha1 = TicketCodec::from_config(&TicketConfig {
            signature_algorithm: SignatureAlgorithm::HmacSha1,
            cipher_algorithm: CipherAlgorithm::Aes128Cbc,
            cipher_key: "5a".repeat(16),
            header_len: Some(16),
            ..config()
        })
        .unwrap();
        // header 16 + body 27 = 43 → 48, plus 20.
        assert_eq!(sha1.min_sealed_len(), 68);
    }
}
