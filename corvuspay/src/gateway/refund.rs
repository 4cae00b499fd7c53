//! Refunds.

use tracing::instrument;

use crate::{
    config::GatewayConfig,
    error::Result,
    gateway::{Operation, execute, require_non_empty},
    response::OperationResult,
    signature::{HashRecipe, SignedRequest},
    transport::Transport,
};

/// Refunds a completed transaction in full.
///
/// # Errors
///
/// Returns [`CorvusError::Configuration`](crate::error::CorvusError::Configuration)
/// without a secret and [`CorvusError::InvalidInput`](crate::error::CorvusError::InvalidInput)
/// for an empty order number; otherwise see [`crate::gateway`].
#[instrument(skip(transport, config), fields(store_id = %config.store_id, operation = "refund"))]
pub async fn refund<T: Transport>(
    transport: &T,
    config: &GatewayConfig,
    order_number: &str,
) -> Result<OperationResult> {
    let secret = config.require_secret()?;
    require_non_empty("order_number", order_number)?;

    let request =
        SignedRequest::sign(&config.store_id, order_number, vec![], HashRecipe::Refund, secret.expose());

    execute(transport, config, Operation::Refund, &request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::CorvusError,
        response::ErrorDetail,
        transport::testing::ScriptedTransport,
    };

    fn config() -> GatewayConfig {
        GatewayConfig::new("1000000").with_secret_key("test-secret-key")
    }

    #[tokio::test]
    async fn test_refund_fields() {
        let transport = ScriptedTransport::responding(
            200,
            "<order><order-number>ORD1</order-number><status>refunded</status></order>",
        );
        let result = refund(&transport, &config(), "ORD1").await.unwrap();

        assert_eq!(transport.requests()[0].url, "https://testcps.corvus.hr/refund");
        let form = transport.last_form();
        assert_eq!(form.len(), 3);
        assert_eq!(form[2].1, "299b656c6b783401e02a8f00b5cf456d62708a6b");
        assert_eq!(result.record().and_then(|r| r.status.as_deref()), Some("refunded"));
    }

    #[tokio::test]
    async fn test_refund_error_with_order_snapshot() {
        let transport = ScriptedTransport::responding(
            400,
            "<errors><description>Order already refunded</description><action>None</action>\
             <order><order-number>ORD1</order-number><status>refunded</status></order></errors>",
        );

        let result = refund(&transport, &config(), "ORD1").await.unwrap();
        let OperationResult::Failure(error) = result else { panic!("expected failure") };
        let ErrorDetail::Order(order) = error.detail else { panic!("expected order snapshot") };
        assert_eq!(order.get("status").map(String::as_str), Some("refunded"));
    }

    #[tokio::test]
    async fn test_refund_transport_failure() {
        let transport = ScriptedTransport::unreachable();
        let err = refund(&transport, &config(), "ORD1").await.unwrap_err();
        assert!(matches!(err, CorvusError::Transport(_)));
    }

    #[tokio::test]
    async fn test_refund_empty_secret_rejected() {
        let transport = ScriptedTransport::responding(200, "<order/>");
        let config = GatewayConfig::new("1000000").with_secret_key("");
        let err = refund(&transport, &config, "ORD1").await.unwrap_err();
        assert!(matches!(err, CorvusError::Configuration(_)));
        assert!(transport.requests().is_empty());
    }
}
