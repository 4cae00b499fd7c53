//! Recurring subscription charges.

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

/// API version sent with subscription charges when none is given.
pub const DEFAULT_SUBSCRIPTION_VERSION: &str = "1.6";

/// A changed amount for the next subscription charge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewAmount {
    /// Amount as a decimal string (e.g. "100.00").
    pub amount: String,
    /// Alphabetic ISO 4217 currency code (e.g. "EUR").
    pub currency: String,
}

/// Parameters for [`next_subscription_payment`].
#[derive(Debug, Clone, Deserialize)]
pub struct NextPaymentParams {
    /// New, unique order number for this charge.
    pub order_number: String,
    /// Stored subscription account identifier.
    pub account_id: String,
    /// API version; defaults to [`DEFAULT_SUBSCRIPTION_VERSION`].
    #[serde(default)]
    pub version: Option<String>,
    /// Optional cart description.
    #[serde(default)]
    pub cart: Option<String>,
    /// Charge a different amount than the initial transaction.
    #[serde(default)]
    pub new_amount: Option<NewAmount>,
}

impl NextPaymentParams {
    /// Creates parameters for a charge at the original amount.
    #[must_use]
    pub fn new(order_number: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into(),
            account_id: account_id.into(),
            version: None,
            cart: None,
            new_amount: None,
        }
    }

    /// Attaches a cart description.
    #[must_use]
    pub fn with_cart(mut self, cart: impl Into<String>) -> Self {
        self.cart = Some(cart.into());
        self
    }

    /// Sets an explicit API version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Charges the next payment of a subscription.
///
/// Sends `store_id`, `order_number`, `subscription=true`, `account_id`, `version`,
/// `new_amount` and `currency` when [`NextPaymentParams::new_amount`] is set, `cart`
/// when given, and `hash`.
///
/// # Errors
///
/// Returns [`CorvusError::Configuration`](crate::error::CorvusError::Configuration)
/// without a secret and [`CorvusError::InvalidInput`](crate::error::CorvusError::InvalidInput)
/// for empty identifiers or an incomplete new amount; otherwise see [`crate::gateway`].
#[instrument(
    skip(transport, config, params),
    fields(
        store_id = %config.store_id,
        order_number = %params.order_number,
        operation = "next_sub_payment",
        new_amount = params.new_amount.is_some()
    )
)]
pub async fn next_subscription_payment<T: Transport>(
    transport: &T,
    config: &GatewayConfig,
    params: NextPaymentParams,
) -> Result<OperationResult> {
    let secret = config.require_secret()?;
    require_non_empty("order_number", &params.order_number)?;
    require_non_empty("account_id", &params.account_id)?;
    if let Some(new_amount) = &params.new_amount {
        require_non_empty("new_amount", &new_amount.amount)?;
        require_non_empty("currency", &new_amount.currency)?;
    }

    let version = params.version.unwrap_or_else(|| DEFAULT_SUBSCRIPTION_VERSION.to_owned());

    let mut extra = vec![
        ("subscription", "true".to_owned()),
        ("account_id", params.account_id.clone()),
        ("version", version.clone()),
    ];
    let recipe = match &params.new_amount {
        Some(new_amount) => {
            extra.push(("new_amount", new_amount.amount.clone()));
            extra.push(("currency", new_amount.currency.clone()));
            HashRecipe::NextSubscriptionPaymentWithAmount {
                version: &version,
                new_amount: &new_amount.amount,
                currency: &new_amount.currency,
            }
        }
        None => HashRecipe::NextSubscriptionPayment { version: &version },
    };
    if let Some(cart) = params.cart.as_ref().filter(|cart| !cart.is_empty()) {
        extra.push(("cart", cart.clone()));
    }

    let request =
        SignedRequest::sign(&config.store_id, &params.order_number, extra, recipe, secret.expose());

    execute(transport, config, Operation::NextSubscriptionPayment, &request).await
}

/// Charges the next payment of a subscription at a new amount.
///
/// # Errors
///
/// See [`next_subscription_payment`].
pub async fn next_subscription_payment_with_amount<T: Transport>(
    transport: &T,
    config: &GatewayConfig,
    params: NextPaymentParams,
    new_amount: NewAmount,
) -> Result<OperationResult> {
    let params = NextPaymentParams { new_amount: Some(new_amount), ..params };
    next_subscription_payment(transport, config, params).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::CorvusError, transport::testing::ScriptedTransport};

    const ORDER: &str = "<order><order-number>SUB2</order-number>\
        <transaction-amount>150.00</transaction-amount>\
        <account-id>acc-123</account-id>\
        <next-recurring>2025-02-15</next-recurring>\
        <transaction_type>2</transaction_type></order>";

    fn config() -> GatewayConfig {
        GatewayConfig::new("1000000").with_secret_key("test-secret-key")
    }

    fn field<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn test_next_payment_fields() {
        let transport = ScriptedTransport::responding(200, ORDER);
        let params = NextPaymentParams::new("ORD1", "acc-123");

        let result = next_subscription_payment(&transport, &config(), params).await.unwrap();

        assert_eq!(transport.requests()[0].url, "https://testcps.corvus.hr/next_sub_payment");
        let form = transport.last_form();
        assert_eq!(field(&form, "subscription"), Some("true"));
        assert_eq!(field(&form, "account_id"), Some("acc-123"));
        assert_eq!(field(&form, "version"), Some("1.6"));
        assert_eq!(field(&form, "hash"), Some("584fa977557ea47302a302b494621e6d03176bdd"));
        assert_eq!(field(&form, "cart"), None);
        assert_eq!(field(&form, "new_amount"), None);

        let record = result.record().unwrap();
        assert_eq!(record.subscription_exp_date.as_deref(), Some("2025-02-15"));
        assert_eq!(record.descriptions.as_ref().map(|d| d.hr), Some("Sljedeća pretplata"));
    }

    #[tokio::test]
    async fn test_next_payment_with_amount_and_cart() {
        let transport = ScriptedTransport::responding(200, ORDER);
        let params = NextPaymentParams::new("ORD1", "acc-123").with_cart("Monthly plan");
        let new_amount = NewAmount { amount: "150.00".to_owned(), currency: "EUR".to_owned() };

        next_subscription_payment_with_amount(&transport, &config(), params, new_amount)
            .await
            .unwrap();

        let form = transport.last_form();
        assert_eq!(field(&form, "new_amount"), Some("150.00"));
        assert_eq!(field(&form, "currency"), Some("EUR"));
        assert_eq!(field(&form, "cart"), Some("Monthly plan"));
        assert_eq!(field(&form, "hash"), Some("d944de5e9509b994b68cb9e8c443b7e38a4f5893"));
    }

    #[tokio::test]
    async fn test_next_payment_rejects_blank_currency() {
        let transport = ScriptedTransport::responding(200, ORDER);
        let new_amount = NewAmount { amount: "150.00".to_owned(), currency: String::new() };

        let err = next_subscription_payment_with_amount(
            &transport,
            &config(),
            NextPaymentParams::new("ORD1", "acc-123"),
            new_amount,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CorvusError::InvalidInput(msg) if msg.contains("currency")));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_next_payment_custom_version_changes_hash() {
        let transport = ScriptedTransport::responding(200, ORDER);
        let params = NextPaymentParams::new("ORD1", "acc-123").with_version("1.7");

        next_subscription_payment(&transport, &config(), params).await.unwrap();

        let form = transport.last_form();
        assert_eq!(field(&form, "version"), Some("1.7"));
        assert_ne!(field(&form, "hash"), Some("584fa977557ea47302a302b494621e6d03176bdd"));
    }
}
