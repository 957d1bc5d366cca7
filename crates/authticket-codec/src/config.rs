//! Codec configuration: algorithms, keys, and ticket policy.
//!
//! Configuration comes in two layers:
//!
//! - [`TicketConfig`] is the plain settings struct. Keys are hex strings so
//!   the whole thing can live in a JSON file. Nothing is checked yet.
//! - [`ResolvedConfig`] is what the codec actually holds. It is produced by
//!   [`TicketConfig::resolve`], which decodes every key exactly once and
//!   checks it against the chosen algorithm. After that it is read-only.
//!
//! Splitting the two means a bad key is a startup error, never a
//! per-request surprise.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use authticket_wire::{MAX_STRING_LEN, string_size};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

// ---------------------------------------------------------------------------
// Algorithms
// ---------------------------------------------------------------------------

/// Keyed hash used to sign the ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    #[serde(rename = "hmac-sha1")]
    HmacSha1,
    #[default]
    #[serde(rename = "hmac-sha256")]
    HmacSha256,
    #[serde(rename = "hmac-sha384")]
    HmacSha384,
    #[serde(rename = "hmac-sha512")]
    HmacSha512,
}

impl SignatureAlgorithm {
    /// Length of the tag appended to every ticket.
    pub const fn signature_len(self) -> usize {
        match self {
            Self::HmacSha1 => 20,
            Self::HmacSha256 => 32,
            Self::HmacSha384 => 48,
            Self::HmacSha512 => 64,
        }
    }

    /// Shortest signing key accepted: one full tag's worth of entropy.
    pub const fn min_key_len(self) -> usize {
        self.signature_len()
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HmacSha1 => write!(f, "hmac-sha1"),
            Self::HmacSha256 => write!(f, "hmac-sha256"),
            Self::HmacSha384 => write!(f, "hmac-sha384"),
            Self::HmacSha512 => write!(f, "hmac-sha512"),
        }
    }
}

/// Symmetric cipher used to encrypt the payload.
///
/// All variants are AES in CBC mode with PKCS#7 padding, differing only in
/// key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CipherAlgorithm {
    #[serde(rename = "aes-128-cbc")]
    Aes128Cbc,
    #[serde(rename = "aes-192-cbc")]
    Aes192Cbc,
    #[default]
    #[serde(rename = "aes-256-cbc")]
    Aes256Cbc,
}

impl CipherAlgorithm {
    /// AES block size; also the ciphertext length granularity.
    pub const BLOCK_LEN: usize = 16;

    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128Cbc => 16,
            Self::Aes192Cbc => 24,
            Self::Aes256Cbc => 32,
        }
    }

    pub const fn iv_len(self) -> usize {
        Self::BLOCK_LEN
    }

    /// Random header length used unless the config overrides it.
    pub const fn default_header_len(self) -> usize {
        32
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aes128Cbc => write!(f, "aes-128-cbc"),
            Self::Aes192Cbc => write!(f, "aes-192-cbc"),
            Self::Aes256Cbc => write!(f, "aes-256-cbc"),
        }
    }
}

/// How generated tickets are handed back, and how input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    /// Upper-case hex text, ready to drop into a cookie value.
    #[default]
    Hex,
    /// Raw bytes.
    Raw,
}

// ---------------------------------------------------------------------------
// TicketConfig
// ---------------------------------------------------------------------------

/// Unvalidated codec settings.
///
/// Fields not present in a JSON document fall back to
/// [`TicketConfig::default`]. The three secrets have no usable default:
/// an empty key fails [`resolve`](Self::resolve).
///
/// ```rust
/// use authticket_codec::TicketConfig;
///
/// let json = r#"{
///     "signature_key": "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
///     "cipher_key":    "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
///     "cipher_iv":     "000102030405060708090a0b0c0d0e0f",
///     "default_ttl_secs": 600
/// }"#;
/// let config = TicketConfig::from_json(json).unwrap().resolve().unwrap();
/// assert_eq!(config.default_ttl().as_secs(), 600);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketConfig {
    pub signature_algorithm: SignatureAlgorithm,
    /// Hex-encoded HMAC key.
    pub signature_key: String,

    pub cipher_algorithm: CipherAlgorithm,
    /// Hex-encoded AES key.
    pub cipher_key: String,
    /// Hex-encoded AES initialization vector.
    pub cipher_iv: String,

    /// Overrides the cipher's default random-header length.
    pub header_len: Option<usize>,

    /// When set, every ticket is issued with this version and tickets
    /// carrying any other version are rejected.
    pub required_version: Option<u8>,

    /// Reject tickets whose expiration date has passed. Default: true.
    pub enforce_expiration: bool,

    /// Lifetime given to tickets issued without an explicit expiration.
    ///
    /// Default: 1800 seconds (30 minutes).
    pub default_ttl_secs: u64,

    /// Persistence flag for tickets that don't specify one.
    pub default_persistent: bool,

    /// Cookie path for tickets that don't specify one. Default: `/`.
    pub default_cookie_path: String,

    /// Re-issue tickets past half their lifetime via
    /// [`TicketCodec::refresh`](crate::TicketCodec::refresh).
    pub sliding_expiration: bool,

    pub output: OutputEncoding,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            signature_algorithm: SignatureAlgorithm::default(),
            signature_key: String::new(),
            cipher_algorithm: CipherAlgorithm::default(),
            cipher_key: String::new(),
            cipher_iv: String::new(),
            header_len: None,
            required_version: None,
            enforce_expiration: true,
            default_ttl_secs: 1800,
            default_persistent: false,
            default_cookie_path: "/".to_string(),
            sliding_expiration: false,
            output: OutputEncoding::default(),
        }
    }
}

impl fmt::Debug for TicketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketConfig")
            .field("signature_algorithm", &self.signature_algorithm)
            .field("signature_key", &"<redacted>")
            .field("cipher_algorithm", &self.cipher_algorithm)
            .field("cipher_key", &"<redacted>")
            .field("cipher_iv", &"<redacted>")
            .field("header_len", &self.header_len)
            .field("required_version", &self.required_version)
            .field("enforce_expiration", &self.enforce_expiration)
            .field("default_ttl_secs", &self.default_ttl_secs)
            .field("default_persistent", &self.default_persistent)
            .field("default_cookie_path", &self.default_cookie_path)
            .field("sliding_expiration", &self.sliding_expiration)
            .field("output", &self.output)
            .finish()
    }
}

impl TicketConfig {
    /// Largest supported random header.
    pub const MAX_HEADER_LEN: usize = 256;

    /// Parses settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON settings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Decodes and checks every setting, producing an immutable
    /// [`ResolvedConfig`].
    ///
    /// # Errors
    /// - [`ConfigError::InvalidHex`] — a key or IV is not hex
    /// - [`ConfigError::KeyLength`] — a key or IV has the wrong size
    /// - [`ConfigError::HeaderLength`] — header override out of range
    /// - [`ConfigError::CookiePathTooLong`] — default path cannot be encoded
    /// - [`ConfigError::TtlOutOfRange`] — default lifetime too large
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let sig = self.signature_algorithm;
        let cipher = self.cipher_algorithm;

        let signature_key = decode_hex("signature_key", &self.signature_key)?;
        if signature_key.len() < sig.min_key_len() {
            return Err(ConfigError::KeyLength {
                field: "signature_key",
                expected: format!("at least {}", sig.min_key_len()),
                actual: signature_key.len(),
            });
        }

        let cipher_key = decode_hex("cipher_key", &self.cipher_key)?;
        check_exact("cipher_key", &cipher_key, cipher.key_len())?;

        let cipher_iv = decode_hex("cipher_iv", &self.cipher_iv)?;
        check_exact("cipher_iv", &cipher_iv, cipher.iv_len())?;

        let header_len = self.header_len.unwrap_or(cipher.default_header_len());
        if !(1..=Self::MAX_HEADER_LEN).contains(&header_len) {
            return Err(ConfigError::HeaderLength(header_len));
        }

        if self.default_cookie_path.len() > MAX_STRING_LEN {
            return Err(ConfigError::CookiePathTooLong(string_size(
                &self.default_cookie_path,
            )));
        }

        // Keep now + ttl comfortably inside an i64 millisecond count.
        if self.default_ttl_secs > (i64::MAX / 1000 / 2) as u64 {
            return Err(ConfigError::TtlOutOfRange(self.default_ttl_secs));
        }

        Ok(ResolvedConfig {
            signature_algorithm: sig,
            signature_key,
            cipher_algorithm: cipher,
            cipher_key,
            cipher_iv,
            header_len,
            required_version: self.required_version,
            enforce_expiration: self.enforce_expiration,
            default_ttl: Duration::from_secs(self.default_ttl_secs),
            default_persistent: self.default_persistent,
            default_cookie_path: self.default_cookie_path.clone(),
            sliding_expiration: self.sliding_expiration,
            output: self.output,
        })
    }
}

fn decode_hex(field: &'static str, value: &str) -> Result<Vec<u8>, ConfigError> {
    hex::decode(value.trim()).map_err(|source| ConfigError::InvalidHex { field, source })
}

fn check_exact(field: &'static str, bytes: &[u8], expected: usize) -> Result<(), ConfigError> {
    if bytes.len() != expected {
        return Err(ConfigError::KeyLength {
            field,
            expected: expected.to_string(),
            actual: bytes.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ResolvedConfig
// ---------------------------------------------------------------------------

/// Checked, decoded configuration. Immutable once built.
///
/// There are no setters: share it (or the codec that owns it) freely
/// across threads.
#[derive(Clone)]
pub struct ResolvedConfig {
    signature_algorithm: SignatureAlgorithm,
    signature_key: Vec<u8>,
    cipher_algorithm: CipherAlgorithm,
    cipher_key: Vec<u8>,
    cipher_iv: Vec<u8>,
    header_len: usize,
    required_version: Option<u8>,
    enforce_expiration: bool,
    default_ttl: Duration,
    default_persistent: bool,
    default_cookie_path: String,
    sliding_expiration: bool,
    output: OutputEncoding,
}

impl ResolvedConfig {
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature_algorithm
    }

    pub fn signature_len(&self) -> usize {
        self.signature_algorithm.signature_len()
    }

    pub fn cipher_algorithm(&self) -> CipherAlgorithm {
        self.cipher_algorithm
    }

    pub fn header_len(&self) -> usize {
        self.header_len
    }

    pub fn required_version(&self) -> Option<u8> {
        self.required_version
    }

    pub fn enforce_expiration(&self) -> bool {
        self.enforce_expiration
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn default_persistent(&self) -> bool {
        self.default_persistent
    }

    pub fn default_cookie_path(&self) -> &str {
        &self.default_cookie_path
    }

    pub fn sliding_expiration(&self) -> bool {
        self.sliding_expiration
    }

    pub fn output(&self) -> OutputEncoding {
        self.output
    }

    pub(crate) fn signature_key(&self) -> &[u8] {
        &self.signature_key
    }

    pub(crate) fn cipher_key(&self) -> &[u8] {
        &self.cipher_key
    }

    pub(crate) fn cipher_iv(&self) -> &[u8] {
        &self.cipher_iv
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("signature_algorithm", &self.signature_algorithm)
            .field("cipher_algorithm", &self.cipher_algorithm)
            .field("header_len", &self.header_len)
            .field("required_version", &self.required_version)
            .field("enforce_expiration", &self.enforce_expiration)
            .field("default_ttl", &self.default_ttl)
            .field("default_persistent", &self.default_persistent)
            .field("default_cookie_path", &self.default_cookie_path)
            .field("sliding_expiration", &self.sliding_expiration)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
