//! Error types for the CorvusPay client.
//!
//! Every fallible function in this crate returns [`Result<T>`], whose error type is
//! [`CorvusError`]. The variants follow the failure stages of a gateway call:
//! configuration is checked before anything is signed, the transport can fail
//! before a response exists, and the response body can fail to parse.
//!
//! Business outcomes reported by the gateway (declines, invalid order states,
//! validation failures) are **not** errors. They arrive as
//! [`OperationResult::Failure`](crate::response::OperationResult::Failure) so callers
//! branch on them like any other result.
//!
//! # Examples
//!
//! ```
//! use corvuspay::error::{CorvusError, Result};
//!
//! fn require_secret(secret: Option<&str>) -> Result<&str> {
//!     secret.ok_or_else(|| CorvusError::Configuration("secret key is required".to_owned()))
//! }
//!
//! assert!(require_secret(None).is_err());
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, CorvusError>;

/// Errors that can occur while talking to the gateway.
///
/// # Error Recovery
///
/// - **Configuration errors** ([`Configuration`](Self::Configuration)): fix the
///   configuration; retrying cannot help
/// - **Network errors** ([`Http`](Self::Http), [`Transport`](Self::Transport)):
///   retry with backoff on top of this crate; no retries happen internally
/// - **Parse errors** ([`Parse`](Self::Parse)): the gateway answered 2xx with a body
///   that is not XML; report to the gateway operator
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum CorvusError {
    /// Client configuration is unusable.
    ///
    /// Raised before any network call. Common causes:
    /// - Missing shared secret
    /// - Empty or malformed client certificate or private key
    /// - Invalid TOML configuration or non-HTTPS base URL
    ///
    /// # Examples
    ///
    /// ```
    /// use corvuspay::error::CorvusError;
    ///
    /// let err = CorvusError::Configuration("secret key is required".to_owned());
    /// assert_eq!(err.to_string(), "Invalid configuration: secret key is required");
    /// ```
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// HTTP request failed without producing a response.
    ///
    /// Wraps [`reqwest::Error`] for connection refusal, DNS failures, TLS handshake
    /// failures (including a rejected client certificate) and timeouts.
    ///
    /// # Recovery
    ///
    /// Retry with exponential backoff. If the error persists, verify the gateway URL
    /// and that the client certificate is the one registered for the store.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport-level failure with no usable body.
    ///
    /// Occurs when the gateway answered with a non-2xx status and the body could not
    /// be read as XML, or when a request URL or endpoint path fails validation.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The gateway answered successfully but the body is not well-formed XML.
    ///
    /// Never coerced into a success result.
    #[error("Failed to parse gateway response: {0}")]
    Parse(String),

    /// Signature computation failed.
    #[error("Signature generation failed: {0}")]
    Signature(String),

    /// A caller-supplied value cannot be sent to the gateway.
    ///
    /// # Examples
    ///
    /// ```
    /// use corvuspay::error::CorvusError;
    ///
    /// let err = CorvusError::InvalidInput("order_number must not be empty".to_owned());
    /// assert!(err.to_string().contains("Invalid input"));
    /// ```
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = CorvusError::Configuration("missing secret".into());
        assert_eq!(error.to_string(), "Invalid configuration: missing secret");
    }

    #[test]
    fn test_parse_error_display() {
        let error = CorvusError::Parse("unexpected end of input".into());
        assert_eq!(error.to_string(), "Failed to parse gateway response: unexpected end of input");
    }

    #[test]
    fn test_transport_error_display() {
        let error = CorvusError::Transport("gateway returned status 502".to_owned());
        assert!(error.to_string().starts_with("Transport error"));
    }

    #[test]
    fn test_invalid_input_error_display() {
        let error = CorvusError::InvalidInput("account_id".to_owned());
        assert_eq!(error.to_string(), "Invalid input: account_id");
    }
}
