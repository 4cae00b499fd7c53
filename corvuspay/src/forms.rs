//! Browser redirect forms.
//!
//! The hosted checkout page and the browser refund endpoint are reached by
//! auto-submitting a hidden HTML form. This module builds the signed field sets
//! and renders them; delivering the HTML to a browser is up to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    config::GatewayConfig,
    error::{CorvusError, Result},
    signature::{FormSigner, SIGNATURE_FIELD},
};

/// Checkout form version sent when none is given.
pub const DEFAULT_CHECKOUT_VERSION: &str = "1.6";

fn default_version() -> String {
    DEFAULT_CHECKOUT_VERSION.to_owned()
}

fn default_language() -> String {
    "en".to_owned()
}

/// Fields of a hosted checkout request, before signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFields {
    /// Checkout API version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Unique order number.
    pub order_number: String,
    /// Checkout page language (e.g. "en", "hr").
    #[serde(default = "default_language")]
    pub language: String,
    /// Alphabetic ISO 4217 currency code.
    pub currency: String,
    /// Amount as a decimal string.
    pub amount: String,
    /// Cart description shown to the cardholder.
    pub cart: String,
    /// Authorize only; capture later with [`complete`](crate::gateway::complete).
    #[serde(default)]
    pub require_complete: bool,
    /// ISO 3166-1 alpha-2 cardholder country code.
    pub cardholder_country_code: String,
    /// Cardholder first name (max 40 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
    /// Cardholder surname (max 40 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_surname: Option<String>,
    /// Cardholder street address (max 100 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_address: Option<String>,
    /// Cardholder city (max 20 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_city: Option<String>,
    /// Cardholder ZIP code (max 9 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_zip_code: Option<String>,
    /// Cardholder country name (max 30 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_country: Option<String>,
    /// Cardholder email (max 100 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_email: Option<String>,
    /// Cardholder phone; sent but not signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_phone: Option<String>,
    /// Cardholder state; sent but not signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardholder_state: Option<String>,
    /// Initiates a subscription when true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<bool>,
    /// Secondary order number (max 36 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_order_number: Option<String>,
    /// Redirect after a successful payment (max 200 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    /// Redirect after a cancelled payment (max 200 characters).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

/// Maximum lengths accepted by the checkout page.
const LENGTH_LIMITS: &[(&str, usize)] = &[
    ("cardholder_name", 40),
    ("cardholder_surname", 40),
    ("cardholder_address", 100),
    ("cardholder_city", 20),
    ("cardholder_zip_code", 9),
    ("cardholder_country", 30),
    ("cardholder_email", 100),
    ("additional_order_number", 36),
    ("success_url", 200),
    ("cancel_url", 200),
];

impl CheckoutFields {
    /// Creates a checkout request with default version, English language and
    /// immediate capture.
    #[must_use]
    pub fn new(
        order_number: impl Into<String>,
        amount: impl Into<String>,
        currency: impl Into<String>,
        cart: impl Into<String>,
        cardholder_country_code: impl Into<String>,
    ) -> Self {
        Self {
            version: default_version(),
            order_number: order_number.into(),
            language: default_language(),
            currency: currency.into(),
            amount: amount.into(),
            cart: cart.into(),
            require_complete: false,
            cardholder_country_code: cardholder_country_code.into(),
            cardholder_name: None,
            cardholder_surname: None,
            cardholder_address: None,
            cardholder_city: None,
            cardholder_zip_code: None,
            cardholder_country: None,
            cardholder_email: None,
            cardholder_phone: None,
            cardholder_state: None,
            subscription: None,
            additional_order_number: None,
            success_url: None,
            cancel_url: None,
        }
    }

    /// Returns the wire field set for `store_id`, without the signature.
    #[must_use]
    pub fn to_fields(&self, store_id: &str) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        let mut put = |name: &str, value: &str| {
            fields.insert(name.to_owned(), value.to_owned());
        };

        put("version", &self.version);
        put("store_id", store_id);
        put("order_number", &self.order_number);
        put("language", &self.language);
        put("currency", &self.currency);
        put("amount", &self.amount);
        put("cart", &self.cart);
        put("require_complete", if self.require_complete { "true" } else { "false" });
        put("cardholder_country_code", &self.cardholder_country_code);

        let optional = [
            ("cardholder_name", &self.cardholder_name),
            ("cardholder_surname", &self.cardholder_surname),
            ("cardholder_address", &self.cardholder_address),
            ("cardholder_city", &self.cardholder_city),
            ("cardholder_zip_code", &self.cardholder_zip_code),
            ("cardholder_country", &self.cardholder_country),
            ("cardholder_email", &self.cardholder_email),
            ("cardholder_phone", &self.cardholder_phone),
            ("cardholder_state", &self.cardholder_state),
            ("additional_order_number", &self.additional_order_number),
            ("success_url", &self.success_url),
            ("cancel_url", &self.cancel_url),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                put(name, value);
            }
        }
        if let Some(subscription) = self.subscription {
            put("subscription", if subscription { "true" } else { "false" });
        }

        fields
    }

    /// Checks required fields and length limits.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("order_number", &self.order_number),
            ("amount", &self.amount),
            ("currency", &self.currency),
            ("cart", &self.cart),
            ("cardholder_country_code", &self.cardholder_country_code),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(CorvusError::InvalidInput(format!("{name} must not be empty")));
            }
        }

        let fields = self.to_fields("");
        for (name, limit) in LENGTH_LIMITS {
            if let Some(value) = fields.get(*name)
                && value.chars().count() > *limit
            {
                return Err(CorvusError::InvalidInput(format!(
                    "{name} exceeds {limit} characters"
                )));
            }
        }
        Ok(())
    }
}

/// A signed checkout form ready to be posted to the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    action: String,
    fields: BTreeMap<String, String>,
}

impl CheckoutForm {
    /// Signs `checkout` with the default exclusion set.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] without a secret and
    /// [`CorvusError::InvalidInput`] for invalid fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use corvuspay::{
    ///     config::GatewayConfig,
    ///     forms::{CheckoutFields, CheckoutForm},
    /// };
    ///
    /// let config = GatewayConfig::new("1000000").with_secret_key("test-secret-key");
    /// let fields = CheckoutFields::new("ORD1", "100.00", "EUR", "Shoes", "HR");
    ///
    /// let form = CheckoutForm::build(&config, &fields)?;
    /// assert_eq!(form.action(), "https://test-wallet.corvuspay.com/checkout/");
    /// assert_eq!(form.signature().len(), 64);
    /// # Ok::<(), corvuspay::error::CorvusError>(())
    /// ```
    pub fn build(config: &GatewayConfig, checkout: &CheckoutFields) -> Result<Self> {
        Self::build_with(config, checkout, &FormSigner::default())
    }

    /// Signs `checkout` with a custom signer.
    ///
    /// # Errors
    ///
    /// See [`CheckoutForm::build`].
    #[instrument(
        skip(config, checkout, signer),
        fields(store_id = %config.store_id, order_number = %checkout.order_number)
    )]
    pub fn build_with(
        config: &GatewayConfig,
        checkout: &CheckoutFields,
        signer: &FormSigner,
    ) -> Result<Self> {
        let secret = config.require_secret()?;
        checkout.validate()?;

        let mut fields = checkout.to_fields(&config.store_id);
        let signature = signer.sign(&fields, secret.expose())?;
        fields.insert(SIGNATURE_FIELD.to_owned(), signature);

        Ok(Self { action: endpoint(&config.checkout_url, "/checkout/"), fields })
    }

    /// Form action URL.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// All hidden fields including `signature`.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// The computed signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        self.fields.get(SIGNATURE_FIELD).map_or("", String::as_str)
    }

    /// Renders a hidden, auto-submitting HTML form.
    #[must_use]
    pub fn render_html(&self) -> String {
        render_hidden_form("corvuspay-checkout", &self.action, self.fields.iter())
    }
}

/// A browser refund form with `store_id`, `order_number` and `signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundForm {
    action: String,
    store_id: String,
    order_number: String,
    signature: String,
}

impl RefundForm {
    /// Builds a refund form, signing `store_id` and `order_number` with the
    /// checkout form recipe.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] without a secret and
    /// [`CorvusError::InvalidInput`] for an empty order number.
    pub fn build(config: &GatewayConfig, order_number: &str) -> Result<Self> {
        let secret = config.require_secret()?;
        if order_number.trim().is_empty() {
            return Err(CorvusError::InvalidInput("order_number must not be empty".to_owned()));
        }

        let signed = BTreeMap::from([
            ("store_id".to_owned(), config.store_id.clone()),
            ("order_number".to_owned(), order_number.to_owned()),
        ]);
        let signature = FormSigner::default().sign(&signed, secret.expose())?;

        Ok(Self::with_signature(&config.api_url, &config.store_id, order_number, signature))
    }

    /// Builds a refund form around a signature computed elsewhere.
    #[must_use]
    pub fn with_signature(
        api_url: &str,
        store_id: &str,
        order_number: &str,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            action: endpoint(api_url, "/refund/"),
            store_id: store_id.to_owned(),
            order_number: order_number.to_owned(),
            signature: signature.into(),
        }
    }

    /// Form action URL.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The three hidden fields, each carrying its own value.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("store_id", self.store_id.as_str()),
            ("order_number", self.order_number.as_str()),
            (SIGNATURE_FIELD, self.signature.as_str()),
        ]
    }

    /// Renders a hidden, auto-submitting HTML form.
    #[must_use]
    pub fn render_html(&self) -> String {
        render_hidden_form("corvuspay-refund", &self.action, self.fields().into_iter())
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn render_hidden_form<K, V>(id: &str, action: &str, fields: impl Iterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut html = format!(
        "<form id=\"{id}\" method=\"POST\" action=\"{}\" style=\"display:none\">\n",
        escape_html(action)
    );
    for (name, value) in fields {
        html.push_str(&format!(
            "  <input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
            escape_html(name.as_ref()),
            escape_html(value.as_ref())
        ));
    }
    html.push_str("</form>\n");
    html.push_str(&format!("<script>document.getElementById(\"{id}\").submit();</script>\n"));
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        GatewayConfig::new("1000000").with_secret_key("test-secret-key")
    }

    fn checkout() -> CheckoutFields {
        CheckoutFields::new("ORD1", "100.00", "EUR", "Shoes", "HR")
    }

    #[test]
    fn test_checkout_signature_reference() {
        let mut fields = checkout();
        fields.cardholder_country_code = String::new();
        let mut wire = fields.to_fields("1000000");
        wire.remove("cardholder_country_code");

        let signature = FormSigner::default().sign(&wire, "test-secret-key").unwrap();
        assert_eq!(signature, "c1ceecac2f844169c9ff9bea59ad9ff0848e31ed336eb964dd7721595e232380");
    }

    #[test]
    fn test_checkout_form_fields() {
        let form = CheckoutForm::build(&config(), &checkout()).unwrap();
        let fields = form.fields();

        assert_eq!(fields["store_id"], "1000000");
        assert_eq!(fields["require_complete"], "false");
        assert_eq!(fields["version"], "1.6");
        assert_eq!(fields["language"], "en");
        assert!(!fields.contains_key("subscription"));
        assert_eq!(form.signature(), fields["signature"]);
    }

    #[test]
    fn test_unsigned_fields_do_not_change_signature() {
        let plain = CheckoutForm::build(&config(), &checkout()).unwrap();

        let mut with_contact = checkout();
        with_contact.cardholder_phone = Some("+385 1 234".to_owned());
        with_contact.cardholder_state = Some("Grad Zagreb".to_owned());
        let contact = CheckoutForm::build(&config(), &with_contact).unwrap();

        assert_eq!(plain.signature(), contact.signature());
        assert_eq!(contact.fields()["cardholder_phone"], "+385 1 234");
    }

    #[test]
    fn test_checkout_requires_secret() {
        let err = CheckoutForm::build(&GatewayConfig::new("1000000"), &checkout()).unwrap_err();
        assert!(matches!(err, CorvusError::Configuration(_)));
    }

    #[test]
    fn test_checkout_length_limits() {
        let mut fields = checkout();
        fields.cardholder_zip_code = Some("1234567890".to_owned());
        let err = fields.validate().unwrap_err();
        assert!(err.to_string().contains("cardholder_zip_code exceeds 9"));

        let mut fields = checkout();
        fields.cart = "  ".to_owned();
        assert!(matches!(fields.validate(), Err(CorvusError::InvalidInput(_))));
    }

    #[test]
    fn test_checkout_requires_country_code() {
        let mut fields = checkout();
        fields.cardholder_country_code = String::new();
        let err = CheckoutForm::build(&config(), &fields).unwrap_err();
        assert!(
            matches!(err, CorvusError::InvalidInput(msg) if msg.contains("cardholder_country_code"))
        );
    }

    #[test]
    fn test_render_html_escapes_values() {
        let mut fields = checkout();
        fields.cart = "Shoes \"Deluxe\" <b>&</b>".to_owned();
        let html = CheckoutForm::build(&config(), &fields).unwrap().render_html();

        assert!(html.contains("action=\"https://test-wallet.corvuspay.com/checkout/\""));
        assert!(html.contains("value=\"Shoes &quot;Deluxe&quot; &lt;b&gt;&amp;&lt;/b&gt;\""));
        assert!(html.contains("document.getElementById(\"corvuspay-checkout\").submit()"));
    }

    #[test]
    fn test_refund_form_assigns_each_field() {
        let form = RefundForm::with_signature("https://testcps.corvus.hr/", "1000000", "ORD1", "sig");
        assert_eq!(form.action(), "https://testcps.corvus.hr/refund/");
        assert_eq!(
            form.fields(),
            [("store_id", "1000000"), ("order_number", "ORD1"), ("signature", "sig")]
        );

        let html = form.render_html();
        assert!(html.contains("name=\"store_id\" value=\"1000000\""));
        assert!(html.contains("name=\"order_number\" value=\"ORD1\""));
        assert!(html.contains("name=\"signature\" value=\"sig\""));
    }

    #[test]
    fn test_refund_form_signed() {
        let form = RefundForm::build(&config(), "ORD1").unwrap();
        let expected = FormSigner::default()
            .sign(
                &BTreeMap::from([
                    ("order_number".to_owned(), "ORD1".to_owned()),
                    ("store_id".to_owned(), "1000000".to_owned()),
                ]),
                "test-secret-key",
            )
            .unwrap();
        assert_eq!(form.fields()[2].1, expected);
    }
}
