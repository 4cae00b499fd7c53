//! Gateway client configuration.
//!
//! [`GatewayConfig`] carries the per-store settings every operation needs and is
//! deserializable from TOML. [`ClientIdentity`] carries the client certificate and
//! private key presented during the TLS handshake.
//!
//! The shared secret is an explicit `Option`: operations reject a configuration
//! without one instead of falling back to a process-wide default.
//!
//! # Examples
//!
//! ```toml
//! store_id = "1000000"
//! secret_key = "my-shared-secret"
//! api_url = "https://cps.corvus.hr"
//!
//! [http]
//! timeout_secs = 20
//! ```

use std::{fmt, path::Path};

use serde::Deserialize;
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    error::{CorvusError, Result},
    transport::HttpConfig,
};

/// Sandbox host for server-to-server operations.
pub const DEFAULT_API_URL: &str = "https://testcps.corvus.hr";

/// Sandbox host for the hosted checkout page.
pub const DEFAULT_CHECKOUT_URL: &str = "https://test-wallet.corvuspay.com";

/// Shared secret issued by the gateway for a store.
///
/// The value is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret for signing.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if the secret is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Per-store gateway settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Merchant store identifier issued by the gateway.
    pub store_id: String,

    /// Shared secret used for request hashes and form signatures.
    #[serde(default)]
    pub secret_key: Option<SecretKey>,

    /// Base URL for server-to-server operations (status, complete, refund, next payment).
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL for the hosted checkout page.
    #[serde(default = "default_checkout_url")]
    pub checkout_url: String,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_checkout_url() -> String {
    DEFAULT_CHECKOUT_URL.to_owned()
}

impl GatewayConfig {
    /// Creates a sandbox configuration for `store_id` with no secret set.
    ///
    /// # Examples
    ///
    /// ```
    /// use corvuspay::config::{DEFAULT_API_URL, GatewayConfig};
    ///
    /// let config = GatewayConfig::new("1000000").with_secret_key("shared-secret");
    /// assert_eq!(config.api_url, DEFAULT_API_URL);
    /// assert!(config.require_secret().is_ok());
    /// ```
    #[must_use]
    pub fn new(store_id: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            secret_key: None,
            api_url: default_api_url(),
            checkout_url: default_checkout_url(),
            http: HttpConfig::default(),
        }
    }

    /// Sets the shared secret.
    #[must_use]
    pub fn with_secret_key(mut self, secret: impl Into<String>) -> Self {
        self.secret_key = Some(SecretKey::new(secret));
        self
    }

    /// Sets the server-to-server base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] if the TOML is malformed or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| CorvusError::Configuration(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CorvusError::Configuration(format!(
                "cannot read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Builds a configuration from environment variables.
    ///
    /// - `CORVUS_STORE_ID` (required)
    /// - `CORVUS_SECRET_KEY`
    /// - `CORVUS_API` (default: sandbox API host)
    /// - `CORVUS_CHECKOUT_URL` (default: sandbox checkout host)
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] if `CORVUS_STORE_ID` is unset or
    /// validation fails.
    pub fn from_env() -> Result<Self> {
        let store_id = std::env::var("CORVUS_STORE_ID").map_err(|_| {
            CorvusError::Configuration("CORVUS_STORE_ID environment variable is not set".to_owned())
        })?;

        let mut config = Self::new(store_id);
        if let Ok(secret) = std::env::var("CORVUS_SECRET_KEY") {
            config.secret_key = Some(SecretKey::new(secret));
        }
        if let Ok(api_url) = std::env::var("CORVUS_API") {
            config.api_url = api_url;
        }
        if let Ok(checkout_url) = std::env::var("CORVUS_CHECKOUT_URL") {
            config.checkout_url = checkout_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks that:
    /// - `store_id` is not empty
    /// - `api_url` and `checkout_url` parse and use HTTPS
    /// - HTTP timeouts are within bounds
    ///
    /// A missing secret is not a validation failure here; operations that need it
    /// call [`require_secret`](Self::require_secret).
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.store_id.trim().is_empty() {
            return Err(CorvusError::Configuration("store_id must not be empty".to_owned()));
        }
        validate_base_url("api_url", &self.api_url)?;
        validate_base_url("checkout_url", &self.checkout_url)?;
        self.http.validate()
    }

    /// Returns the shared secret or a configuration error when it is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] if no usable secret is configured.
    pub fn require_secret(&self) -> Result<&SecretKey> {
        match &self.secret_key {
            Some(secret) if !secret.is_empty() => Ok(secret),
            Some(_) => Err(CorvusError::Configuration("secret key must not be empty".to_owned())),
            None => Err(CorvusError::Configuration(
                "secret key is required: set `secret_key` in the gateway configuration".to_owned(),
            )),
        }
    }
}

fn validate_base_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| CorvusError::Configuration(format!("invalid {name} '{value}': {e}")))?;

    if url.scheme() != "https" {
        return Err(CorvusError::Configuration(format!(
            "{name} must use HTTPS, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(CorvusError::Configuration(format!("{name} has no host: {value}")));
    }

    Ok(())
}

/// Client certificate and private key presented to the gateway.
///
/// Both values are PEM-encoded. The private key is wiped from memory on drop.
#[derive(Clone)]
pub struct ClientIdentity {
    certificate: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
}

impl ClientIdentity {
    /// Creates an identity from PEM certificate and key material.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] if either input is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use corvuspay::config::ClientIdentity;
    ///
    /// assert!(ClientIdentity::from_pem(b"", b"key").is_err());
    /// ```
    pub fn from_pem(certificate: impl Into<Vec<u8>>, private_key: impl Into<Vec<u8>>) -> Result<Self> {
        let certificate = certificate.into();
        let private_key = Zeroizing::new(private_key.into());

        if certificate.iter().all(u8::is_ascii_whitespace) {
            return Err(CorvusError::Configuration("client certificate is empty".to_owned()));
        }
        if private_key.iter().all(u8::is_ascii_whitespace) {
            return Err(CorvusError::Configuration("client private key is empty".to_owned()));
        }

        Ok(Self { certificate, private_key })
    }

    /// Reads certificate and key PEM files.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] if either file is unreadable or empty.
    pub fn from_files<C: AsRef<Path>, K: AsRef<Path>>(cert_path: C, key_path: K) -> Result<Self> {
        let certificate = std::fs::read(cert_path.as_ref()).map_err(|e| {
            CorvusError::Configuration(format!(
                "cannot read client certificate {}: {e}",
                cert_path.as_ref().display()
            ))
        })?;
        let private_key = std::fs::read(key_path.as_ref()).map_err(|e| {
            CorvusError::Configuration(format!(
                "cannot read client private key {}: {e}",
                key_path.as_ref().display()
            ))
        })?;
        Self::from_pem(certificate, private_key)
    }

    /// Returns certificate and key concatenated into one PEM bundle.
    #[must_use]
    pub fn pem_bundle(&self) -> Zeroizing<Vec<u8>> {
        let mut bundle = Zeroizing::new(Vec::with_capacity(
            self.certificate.len() + self.private_key.len() + 1,
        ));
        bundle.extend_from_slice(&self.certificate);
        if !self.certificate.ends_with(b"\n") {
            bundle.push(b'\n');
        }
        bundle.extend_from_slice(&self.private_key);
        bundle
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("certificate_len", &self.certificate.len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_config_from_minimal_toml() {
        let config = GatewayConfig::from_toml("store_id = \"1000000\"").unwrap();
        assert_eq!(config.store_id, "1000000");
        assert!(config.secret_key.is_none());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.checkout_url, DEFAULT_CHECKOUT_URL);
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_gateway_config_from_full_toml() {
        let toml = r#"
            store_id = "42"
            secret_key = "s3cret"
            api_url = "https://cps.corvus.hr"
            checkout_url = "https://wallet.corvuspay.com"

            [http]
            timeout_secs = 15
            connect_timeout_secs = 5
        "#;

        let config = GatewayConfig::from_toml(toml).unwrap();
        assert_eq!(config.require_secret().unwrap().expose(), "s3cret");
        assert_eq!(config.api_url, "https://cps.corvus.hr");
        assert_eq!(config.http.timeout_secs, 15);
        assert_eq!(config.http.connect_timeout_secs, 5);
    }

    #[test]
    fn test_gateway_config_rejects_http_url() {
        let toml = r#"
            store_id = "42"
            api_url = "http://testcps.corvus.hr"
        "#;
        let result = GatewayConfig::from_toml(toml);
        assert!(matches!(result, Err(CorvusError::Configuration(msg)) if msg.contains("HTTPS")));
    }

    #[test]
    fn test_gateway_config_rejects_empty_store_id() {
        let result = GatewayConfig::from_toml("store_id = \"  \"");
        assert!(matches!(result, Err(CorvusError::Configuration(_))));
    }

    #[test]
    fn test_gateway_config_rejects_invalid_toml() {
        let result = GatewayConfig::from_toml("store_id = ");
        assert!(matches!(result, Err(CorvusError::Configuration(_))));
    }

    #[test]
    fn test_require_secret_missing() {
        let config = GatewayConfig::new("1000000");
        let err = config.require_secret().unwrap_err();
        assert!(matches!(err, CorvusError::Configuration(msg) if msg.contains("secret key")));
    }

    #[test]
    fn test_require_secret_empty() {
        let config = GatewayConfig::new("1000000").with_secret_key("");
        assert!(config.require_secret().is_err());
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let config = GatewayConfig::new("1000000").with_secret_key("do-not-print");
        let debug = format!("{config:?}");
        assert!(!debug.contains("do-not-print"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_client_identity_rejects_empty_material() {
        assert!(ClientIdentity::from_pem(Vec::new(), b"key".to_vec()).is_err());
        assert!(ClientIdentity::from_pem(b"cert".to_vec(), b" \n".to_vec()).is_err());
    }

    #[test]
    fn test_client_identity_pem_bundle() {
        let identity = ClientIdentity::from_pem(b"CERT".to_vec(), b"KEY\n".to_vec()).unwrap();
        assert_eq!(identity.pem_bundle().as_slice(), b"CERT\nKEY\n");

        let identity = ClientIdentity::from_pem(b"CERT\n".to_vec(), b"KEY".to_vec()).unwrap();
        assert_eq!(identity.pem_bundle().as_slice(), b"CERT\nKEY");
    }

    #[test]
    fn test_client_identity_debug_hides_key() {
        let identity = ClientIdentity::from_pem(b"CERT".to_vec(), b"PRIVATE".to_vec()).unwrap();
        let debug = format!("{identity:?}");
        assert!(!debug.contains("PRIVATE"));
    }

    #[test]
    fn test_client_identity_missing_file() {
        let result = ClientIdentity::from_files("/nonexistent/cert.pem", "/nonexistent/key.pem");
        assert!(matches!(result, Err(CorvusError::Configuration(msg)) if msg.contains("certificate")));
    }
}
