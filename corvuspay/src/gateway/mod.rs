//! Gateway operations.
//!
//! One stateless async function per gateway capability. Each call:
//!
//! 1. requires a shared secret in [`GatewayConfig`]
//! 2. fills in the operation's timestamp and version defaults
//! 3. signs the field set with the operation's [`HashRecipe`](crate::signature::HashRecipe)
//! 4. POSTs it through a [`Transport`] and normalizes the XML reply
//!
//! Business errors come back as [`OperationResult::Failure`], including those sent
//! with a non-2xx status. Only configuration problems, unusable responses and
//! network failures are `Err`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use corvuspay::{
//!     config::{ClientIdentity, GatewayConfig},
//!     gateway::{StatusParams, check_status},
//!     transport::MtlsTransport,
//! };
//!
//! # async fn example() -> corvuspay::error::Result<()> {
//! let config = GatewayConfig::from_file("corvuspay.toml")?;
//! let identity = ClientIdentity::from_files("client.crt", "client.key")?;
//! let transport = MtlsTransport::new(&identity, &config.http)?;
//!
//! let result = check_status(&transport, &config, StatusParams::new("ORD1", "978")).await?;
//! if let Some(record) = result.record() {
//!     println!("status: {:?}", record.status);
//! }
//! # Ok(())
//! # }
//! ```

mod complete;
mod refund;
mod status;
mod subscription;

use std::fmt;

pub use complete::{complete, complete_subscription};
pub use refund::refund;
pub use status::{DEFAULT_STATUS_VERSION, StatusParams, check_status};
pub use subscription::{
    DEFAULT_SUBSCRIPTION_VERSION, NewAmount, NextPaymentParams, next_subscription_payment,
    next_subscription_payment_with_amount,
};
use tracing::{debug, info, warn};

use crate::{
    config::GatewayConfig,
    error::{CorvusError, Result},
    response::{self, OperationResult},
    signature::SignedRequest,
    transport::{RequestContext, Transport},
};

/// Server-to-server gateway endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Transaction status check.
    Status,
    /// Capture of a preauthorized transaction.
    Complete,
    /// Refund of a completed transaction.
    Refund,
    /// Next charge of a stored subscription.
    NextSubscriptionPayment,
}

impl Operation {
    /// Endpoint path under the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Status => "/status",
            Self::Complete => "/complete",
            Self::Refund => "/refund",
            Self::NextSubscriptionPayment => "/next_sub_payment",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().trim_start_matches('/'))
    }
}

fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CorvusError::InvalidInput(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Sends a signed request and normalizes the reply.
async fn execute<T: Transport>(
    transport: &T,
    config: &GatewayConfig,
    operation: Operation,
    request: &SignedRequest,
) -> Result<OperationResult> {
    let ctx = RequestContext { base_url: &config.api_url, path: operation.path() };
    let body = request.to_form_body();

    info!(%operation, protocol = transport.protocol_name(), "sending gateway request");
    let response = transport.post_form(ctx, &body).await?;
    debug!(%operation, status = response.status, body_len = response.body.len(), "received gateway response");

    if response.is_success() {
        let result = response::normalize(&response.body)?;
        info!(%operation, fully_mapped = result.is_fully_mapped(), "gateway request completed");
        return Ok(result);
    }

    match response::normalize(&response.body) {
        Ok(result) => {
            warn!(
                %operation,
                status = response.status,
                failure = !result.is_success(),
                "gateway answered with error status"
            );
            Ok(result)
        }
        Err(e) => Err(CorvusError::Transport(format!(
            "{operation} request failed with HTTP {}: {e}",
            response.status
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        signature::HashRecipe,
        transport::testing::ScriptedTransport,
    };

    fn config() -> GatewayConfig {
        GatewayConfig::new("1000000").with_secret_key("test-secret-key")
    }

    fn refund_request() -> SignedRequest {
        SignedRequest::sign("1000000", "ORD1", vec![], HashRecipe::Refund, "test-secret-key")
    }

    #[test]
    fn test_operation_paths() {
        assert_eq!(Operation::Status.path(), "/status");
        assert_eq!(Operation::Complete.path(), "/complete");
        assert_eq!(Operation::Refund.path(), "/refund");
        assert_eq!(Operation::NextSubscriptionPayment.path(), "/next_sub_payment");
        assert_eq!(Operation::NextSubscriptionPayment.to_string(), "next_sub_payment");
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("order_number", "ORD1").is_ok());
        let err = require_non_empty("order_number", "  ").unwrap_err();
        assert!(matches!(err, CorvusError::InvalidInput(msg) if msg.contains("order_number")));
    }

    #[tokio::test]
    async fn test_error_envelope_on_error_status_is_failure() {
        let transport = ScriptedTransport::responding(
            400,
            "<errors><description>Order not found</description><action>Check order</action></errors>",
        );
        let result = execute(&transport, &config(), Operation::Refund, &refund_request()).await.unwrap();
        assert_eq!(result.error().and_then(|e| e.description.as_deref()), Some("Order not found"));
    }

    #[tokio::test]
    async fn test_unparsable_error_status_is_transport_error() {
        let transport = ScriptedTransport::responding(502, "Bad Gateway");
        let err = execute(&transport, &config(), Operation::Refund, &refund_request()).await.unwrap_err();
        assert!(matches!(&err, CorvusError::Transport(msg) if msg.contains("HTTP 502")));
    }

    #[tokio::test]
    async fn test_empty_error_body_is_transport_error() {
        let transport = ScriptedTransport::responding(500, "");
        let err = execute(&transport, &config(), Operation::Refund, &refund_request()).await.unwrap_err();
        assert!(matches!(err, CorvusError::Transport(_)));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_parse_error() {
        let transport = ScriptedTransport::responding(200, "<order><status>");
        let err = execute(&transport, &config(), Operation::Refund, &refund_request()).await.unwrap_err();
        assert!(matches!(err, CorvusError::Parse(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_propagates() {
        let transport = ScriptedTransport::unreachable();
        let err = execute(&transport, &config(), Operation::Refund, &refund_request()).await.unwrap_err();
        assert!(matches!(err, CorvusError::Transport(msg) if msg.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_request_goes_to_operation_path() {
        let transport = ScriptedTransport::responding(200, "<order/>");
        let config = config().with_api_url("https://cps.example.com/");
        execute(&transport, &config, Operation::Complete, &refund_request()).await.unwrap();
        assert_eq!(transport.requests()[0].url, "https://cps.example.com/complete");
    }
}
