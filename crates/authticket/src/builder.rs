//! `TicketCodecBuilder`: fluent construction of a [`TicketCodec`].
//!
//! An alternative to filling in a [`TicketConfig`] by hand or loading one
//! from JSON. The builder only collects settings; all checking happens in
//! [`build`](TicketCodecBuilder::build), which resolves the config exactly
//! like [`TicketConfig::resolve`] does.

use std::path::Path;
use std::time::Duration;

use authticket_codec::{
    CipherAlgorithm, OutputEncoding, SignatureAlgorithm, TicketCodec, TicketConfig,
};

use crate::AuthTicketError;

/// Builder for a [`TicketCodec`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use authticket::prelude::*;
///
/// let codec = TicketCodecBuilder::new()
///     .signature(SignatureAlgorithm::HmacSha256, "ab".repeat(32))
///     .cipher(CipherAlgorithm::Aes256Cbc, "cd".repeat(32), "ef".repeat(16))
///     .ttl(Duration::from_secs(600))
///     .cookie_path("/app")
///     .build()
///     .unwrap();
///
/// let cookie = codec.generate(&TicketParams::new("alice")).unwrap();
/// assert_eq!(codec.validate(&cookie).unwrap().cookie_path, "/app");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TicketCodecBuilder {
    config: TicketConfig,
}

impl TicketCodecBuilder {
    /// Starts from [`TicketConfig::default`]. Keys must still be supplied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing config.
    pub fn from_config(config: TicketConfig) -> Self {
        Self { config }
    }

    /// Starts from a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AuthTicketError> {
        Ok(Self::from_config(TicketConfig::from_json_file(path)?))
    }

    /// Sets the signature algorithm and its hex-encoded key.
    pub fn signature(mut self, algorithm: SignatureAlgorithm, key_hex: impl Into<String>) -> Self {
        self.config.signature_algorithm = algorithm;
        self.config.signature_key = key_hex.into();
        self
    }

    /// Sets the cipher and its hex-encoded key and IV.
    pub fn cipher(
        mut self,
        algorithm: CipherAlgorithm,
        key_hex: impl Into<String>,
        iv_hex: impl Into<String>,
    ) -> Self {
        self.config.cipher_algorithm = algorithm;
        self.config.cipher_key = key_hex.into();
        self.config.cipher_iv = iv_hex.into();
        self
    }

    pub fn header_len(mut self, len: usize) -> Self {
        self.config.header_len = Some(len);
        self
    }

    /// Pins the ticket version.
    pub fn required_version(mut self, version: u8) -> Self {
        self.config.required_version = Some(version);
        self
    }

    pub fn enforce_expiration(mut self, enforce: bool) -> Self {
        self.config.enforce_expiration = enforce;
        self
    }

    /// Default lifetime, rounded down to whole seconds.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl_secs = ttl.as_secs();
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.config.default_persistent = persistent;
        self
    }

    pub fn cookie_path(mut self, path: impl Into<String>) -> Self {
        self.config.default_cookie_path = path.into();
        self
    }

    pub fn sliding_expiration(mut self, sliding: bool) -> Self {
        self.config.sliding_expiration = sliding;
        self
    }

    pub fn output(mut self, output: OutputEncoding) -> Self {
        self.config.output = output;
        self
    }

    /// Resolves the collected settings and builds the codec.
    ///
    /// # Errors
    /// [`AuthTicketError::Config`] if any key, IV, or policy value is
    /// invalid.
    pub fn build(self) -> Result<TicketCodec, AuthTicketError> {
        Ok(TicketCodec::from_config(&self.config)?)
    }
}

#[cfg(test)]
mod tests {
    use authticket_codec::{ConfigError, TicketParams, Timestamp};

    use super::*;

    fn keyed() -> TicketCodecBuilder {
        TicketCodecBuilder::new()
            .signature(SignatureAlgorithm::HmacSha384, "01".repeat(48))
            .cipher(CipherAlgorithm::Aes128Cbc, "02".repeat(16), "03".repeat(16))
    }

    #[test]
    fn test_build_without_keys_fails() {
        let result = TicketCodecBuilder::new().build();
        assert!(matches!(
            result,
            Err(AuthTicketError::Config(ConfigError::KeyLength { .. }))
        ));
    }

    #[test]
    fn test_build_applies_every_setting() {
        let codec = keyed()
            .header_len(8)
            .required_version(9)
            .enforce_expiration(false)
            .ttl(Duration::from_secs(90))
            .persistent(true)
            .cookie_path("/x")
            .sliding_expiration(true)
            .output(OutputEncoding::Raw)
            .build()
            .expect("valid settings");

        let cfg = codec.config();
        assert_eq!(cfg.signature_algorithm(), SignatureAlgorithm::HmacSha384);
        assert_eq!(cfg.cipher_algorithm(), CipherAlgorithm::Aes128Cbc);
        assert_eq!(cfg.header_len(), 8);
        assert_eq!(cfg.required_version(), Some(9));
        assert!(!cfg.enforce_expiration());
        assert_eq!(cfg.default_ttl(), Duration::from_secs(90));
        assert!(cfg.default_persistent());
        assert_eq!(cfg.default_cookie_path(), "/x");
        assert!(cfg.sliding_expiration());
        assert_eq!(cfg.output(), OutputEncoding::Raw);
    }

    #[test]
    fn test_built_codec_round_trips() {
        let codec = keyed().build().unwrap();
        let now = Timestamp::now();
        let sealed = codec.generate(&TicketParams::new("dave")).unwrap();
        assert_eq!(codec.validate_at(&sealed, now).unwrap().name, "dave");
    }

    #[test]
    fn test_from_json_file_missing_is_io_error() {
        let result = TicketCodecBuilder::from_json_file("/definitely/not/here.json");
        assert!(matches!(
            result,
            Err(AuthTicketError::Config(ConfigError::Io(_)))
        ));
    }
}
