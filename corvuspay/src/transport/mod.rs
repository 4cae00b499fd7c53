//! Transport layer.
//!
//! This module provides a sealed `Transport` trait for delivering one
//! form-encoded POST to a gateway endpoint and returning the raw response text.
//!
//! # Architecture
//!
//! The transport layer separates protocol mechanics from gateway semantics:
//! - **Transport**: TLS session with a client certificate, form POST, body as text
//! - **Gateway operations**: field sets, hashes and response normalization
//!
//! A transport returns the body for every HTTP status. The gateway reports
//! business errors as XML with non-2xx status codes, so only failures with no
//! response at all surface as errors here.
//!
//! # Examples
//!
//! ```rust,no_run
//! use corvuspay::{
//!     config::ClientIdentity,
//!     transport::{HttpConfig, MtlsTransport, RequestContext, Transport},
//! };
//!
//! # async fn example(cert: Vec<u8>, key: Vec<u8>) -> corvuspay::error::Result<()> {
//! let identity = ClientIdentity::from_pem(cert, key)?;
//! let transport = MtlsTransport::new(&identity, &HttpConfig::default())?;
//!
//! let ctx = RequestContext { base_url: "https://testcps.corvus.hr", path: "/status" };
//! let response = transport.post_form(ctx, "store_id=1000000&order_number=ORD1").await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::error::Result;

pub mod config;
pub mod http;
mod sealed;

pub use config::HttpConfig;
pub use http::MtlsTransport;

/// Request context for transport operations.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Gateway base URL (e.g., <https://testcps.corvus.hr>).
    pub base_url: &'a str,
    /// Endpoint path (e.g., "/status").
    pub path: &'a str,
}

/// Response from transport operations.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
    /// Response headers.
    pub headers: Vec<(String, String)>,
}

impl TransportResponse {
    /// Returns true for 2xx status codes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport protocol abstraction.
///
/// This trait is sealed: every implementation presents the client certificate
/// and keeps server certificate verification enabled.
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// POSTs an `application/x-www-form-urlencoded` body to `ctx.base_url + ctx.path`.
    ///
    /// Returns the response for any HTTP status.
    ///
    /// # Errors
    ///
    /// Returns error only when no response is obtainable: invalid URL or path,
    /// connection refused, TLS handshake failure or timeout.
    fn post_form<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a str,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_copy() {
        let ctx = RequestContext { base_url: "https://testcps.corvus.hr", path: "/status" };
        let copied = ctx;
        assert_eq!(ctx.base_url, copied.base_url);
        assert_eq!(copied.path, "/status");
    }

    #[test]
    fn test_transport_response_success_range() {
        let response = TransportResponse { status: 200, body: String::new(), headers: vec![] };
        assert!(response.is_success());

        let response = TransportResponse { status: 299, body: String::new(), headers: vec![] };
        assert!(response.is_success());
    }

    #[test]
    fn test_transport_response_error_status() {
        let response = TransportResponse {
            status: 400,
            body: "<errors/>".to_owned(),
            headers: vec![],
        };
        assert!(!response.is_success());
        assert_eq!(response.body, "<errors/>");
    }

    #[test]
    fn test_transport_response_debug() {
        let response = TransportResponse { status: 502, body: String::new(), headers: vec![] };
        let debug_str = format!("{response:?}");
        assert!(debug_str.contains("TransportResponse"));
        assert!(debug_str.contains("502"));
    }
}
