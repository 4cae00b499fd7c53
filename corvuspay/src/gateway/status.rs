//! Transaction status check.

use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    config::GatewayConfig,
    error::Result,
    gateway::{Operation, execute, require_non_empty},
    response::OperationResult,
    signature::{HashRecipe, SignedRequest},
    transport::Transport,
};

/// API version sent with status checks when none is given.
pub const DEFAULT_STATUS_VERSION: &str = "5.0";

/// Parameters for [`check_status`].
#[derive(Debug, Clone, Deserialize)]
pub struct StatusParams {
    /// Order to look up.
    pub order_number: String,
    /// Numeric ISO 4217 currency code of the order (e.g. "978").
    pub currency_code: String,
    /// Request timestamp; defaults to the current UTC date (`YYYY-MM-DD`).
    #[serde(default)]
    pub timestamp: Option<String>,
    /// API version; defaults to [`DEFAULT_STATUS_VERSION`].
    #[serde(default)]
    pub version: Option<String>,
}

impl StatusParams {
    /// Creates parameters with default timestamp and version.
    #[must_use]
    pub fn new(order_number: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into(),
            currency_code: currency_code.into(),
            timestamp: None,
            version: None,
        }
    }

    /// Sets an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Sets an explicit API version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Checks the status of a transaction.
///
/// Sends `store_id`, `order_number`, `currency_code`, `timestamp`, `version` and
/// `hash`. The timestamp default is computed once and used for both the hash and
/// the form field.
///
/// # Errors
///
/// - [`CorvusError::Configuration`](crate::error::CorvusError::Configuration) if no secret is configured
/// - [`CorvusError::InvalidInput`](crate::error::CorvusError::InvalidInput) for an empty order number or currency code
/// - transport and parse errors as described in [`crate::gateway`]
#[instrument(
    skip(transport, config, params),
    fields(store_id = %config.store_id, order_number = %params.order_number, operation = "status")
)]
pub async fn check_status<T: Transport>(
    transport: &T,
    config: &GatewayConfig,
    params: StatusParams,
) -> Result<OperationResult> {
    let secret = config.require_secret()?;
    require_non_empty("order_number", &params.order_number)?;
    require_non_empty("currency_code", &params.currency_code)?;

    let timestamp = params.timestamp.unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());
    let version = params.version.unwrap_or_else(|| DEFAULT_STATUS_VERSION.to_owned());

    let recipe = HashRecipe::Status {
        currency_code: &params.currency_code,
        timestamp: &timestamp,
        version: &version,
    };
    let request = SignedRequest::sign(
        &config.store_id,
        &params.order_number,
        vec![
            ("currency_code", params.currency_code.clone()),
            ("timestamp", timestamp.clone()),
            ("version", version.clone()),
        ],
        recipe,
        secret.expose(),
    );

    execute(transport, config, Operation::Status, &request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::CorvusError, transport::testing::ScriptedTransport};

    const TRANS_STATUS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<trans-status>
  <order-number>ORD1</order-number>
  <transaction-amount type="decimal">100.00</transaction-amount>
  <status>authorized</status>
  <response-code type="integer">0</response-code>
  <transaction_type>7</transaction_type>
</trans-status>"#;

    fn config() -> GatewayConfig {
        GatewayConfig::new("1000000").with_secret_key("test-secret-key")
    }

    #[tokio::test]
    async fn test_status_form_fields_and_hash() {
        let transport = ScriptedTransport::responding(200, TRANS_STATUS);
        let params = StatusParams::new("ORD1", "978").with_timestamp("2024-01-15").with_version("5.0");

        let result = check_status(&transport, &config(), params).await.unwrap();

        let form = transport.last_form();
        let names: Vec<&str> = form.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["store_id", "order_number", "currency_code", "timestamp", "version", "hash"]);
        assert_eq!(form[5].1, "b07d3282a3684322cd9fce3d82594cbb9b169ec4");
        assert_eq!(transport.requests()[0].url, "https://testcps.corvus.hr/status");

        let record = result.record().unwrap();
        assert_eq!(record.amount.as_deref(), Some("100.00"));
        assert_eq!(record.response_code.as_deref(), Some("0"));
        assert_eq!(
            record.descriptions.as_ref().map(|d| d.en),
            Some("Saving a card during fast registration")
        );
    }

    #[tokio::test]
    async fn test_status_defaults() {
        let transport = ScriptedTransport::responding(200, TRANS_STATUS);
        check_status(&transport, &config(), StatusParams::new("ORD1", "978")).await.unwrap();

        let form = transport.last_form();
        let timestamp = &form[3].1;
        assert_eq!(timestamp.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(timestamp, "%Y-%m-%d").is_ok());
        assert_eq!(form[4], ("version".to_owned(), "5.0".to_owned()));

        let recipe = HashRecipe::Status { currency_code: "978", timestamp, version: "5.0" };
        assert_eq!(form[5].1, recipe.digest("test-secret-key", "ORD1", "1000000"));
    }

    #[tokio::test]
    async fn test_status_requires_secret() {
        let transport = ScriptedTransport::responding(200, TRANS_STATUS);
        let config = GatewayConfig::new("1000000");

        let err = check_status(&transport, &config, StatusParams::new("ORD1", "978")).await.unwrap_err();
        assert!(matches!(err, CorvusError::Configuration(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_status_rejects_empty_order_number() {
        let transport = ScriptedTransport::responding(200, TRANS_STATUS);
        let err = check_status(&transport, &config(), StatusParams::new("", "978")).await.unwrap_err();
        assert!(matches!(err, CorvusError::InvalidInput(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: StatusParams =
            serde_json::from_str(r#"{"order_number":"ORD1","currency_code":"978"}"#).unwrap();
        assert!(params.timestamp.is_none());
        assert!(params.version.is_none());
    }
}
