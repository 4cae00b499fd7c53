//! Source-name tables for the success shapes.
//!
//! Each table lists `(element name, canonical field)` pairs in priority order.
//! When several source elements feed the same field, the first one present with
//! non-empty text wins. Values are always the element's inline text; attributes
//! such as `type="decimal"` are ignored.

use std::collections::BTreeMap;

use tracing::debug;

use crate::response::xml::XmlElement;

/// Canonical transaction record fields.
#[allow(missing_docs, reason = "each variant is documented by its canonical name")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    OrderNumber,
    Amount,
    TransactionDatetime,
    Status,
    ResponseMessage,
    ResponseCode,
    CurrencyCode,
    CardType,
    CardholderName,
    CardholderSurname,
    CardholderAddress,
    CardholderCity,
    CardholderZipCode,
    CardholderEmail,
    CardholderPhone,
    CardholderCountry,
    CardholderCountryCode,
    InstallmentsNumber,
    CardMaskedNumber,
    Rrn,
    ApprovalCode,
    AcquirerCode,
    TransactionType,
    AdditionalOrderNumber,
    SubscriptionExpDate,
    AccountId,
    Cart,
    MerchantId,
    CompanyId,
    Ip,
    Language,
    Delivery,
    ExpirationDate,
    CardEntryMode,
    CardMemberAuthentication,
    CardPresent,
    CardholderPresent,
}

impl Field {
    /// Canonical snake_case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OrderNumber => "order_number",
            Self::Amount => "amount",
            Self::TransactionDatetime => "transaction_datetime",
            Self::Status => "status",
            Self::ResponseMessage => "response_message",
            Self::ResponseCode => "response_code",
            Self::CurrencyCode => "currency_code",
            Self::CardType => "card_type",
            Self::CardholderName => "cardholder_name",
            Self::CardholderSurname => "cardholder_surname",
            Self::CardholderAddress => "cardholder_address",
            Self::CardholderCity => "cardholder_city",
            Self::CardholderZipCode => "cardholder_zip_code",
            Self::CardholderEmail => "cardholder_email",
            Self::CardholderPhone => "cardholder_phone",
            Self::CardholderCountry => "cardholder_country",
            Self::CardholderCountryCode => "cardholder_country_code",
            Self::InstallmentsNumber => "installments_number",
            Self::CardMaskedNumber => "card_masked_number",
            Self::Rrn => "rrn",
            Self::ApprovalCode => "approval_code",
            Self::AcquirerCode => "acquirer_code",
            Self::TransactionType => "transaction_type",
            Self::AdditionalOrderNumber => "additional_order_number",
            Self::SubscriptionExpDate => "subscription_exp_date",
            Self::AccountId => "account_id",
            Self::Cart => "cart",
            Self::MerchantId => "merchant_id",
            Self::CompanyId => "company_id",
            Self::Ip => "ip",
            Self::Language => "language",
            Self::Delivery => "delivery",
            Self::ExpirationDate => "expiration_date",
            Self::CardEntryMode => "card_entry_mode",
            Self::CardMemberAuthentication => "card_member_authentication",
            Self::CardPresent => "card_present",
            Self::CardholderPresent => "cardholder_present",
        }
    }
}

/// Fields shared by both success shapes, keyed by their `trans-status` names.
const COMMON: &[(&str, Field)] = &[
    ("order-number", Field::OrderNumber),
    ("status", Field::Status),
    ("currency-code", Field::CurrencyCode),
    ("cc-type", Field::CardType),
    ("cardholder-name", Field::CardholderName),
    ("cardholder-surname", Field::CardholderSurname),
    ("cardholder-address", Field::CardholderAddress),
    ("cardholder-city", Field::CardholderCity),
    ("cardholder-zip-code", Field::CardholderZipCode),
    ("cardholder-email", Field::CardholderEmail),
    ("cardholder-phone", Field::CardholderPhone),
    ("cardholder-country", Field::CardholderCountry),
    ("cardholder-country-code", Field::CardholderCountryCode),
    ("installments-number", Field::InstallmentsNumber),
    ("card-details", Field::CardMaskedNumber),
    ("approval-code", Field::ApprovalCode),
    ("acquirer_code", Field::AcquirerCode),
    ("transaction_type", Field::TransactionType),
    ("additional_order_number", Field::AdditionalOrderNumber),
    ("account-id", Field::AccountId),
];

/// Status-check (`trans-status`) specific sources.
const TRANS_STATUS_ONLY: &[(&str, Field)] = &[
    ("transaction-amount", Field::Amount),
    ("transaction-date-and-time", Field::TransactionDatetime),
    ("response-message", Field::ResponseMessage),
    ("response-code", Field::ResponseCode),
    ("reference-number", Field::Rrn),
    ("subscription-exp-date", Field::SubscriptionExpDate),
];

/// Capture, refund and subscription (`order`) specific sources.
const ORDER_ONLY: &[(&str, Field)] = &[
    ("transaction-amount", Field::Amount),
    ("amount", Field::Amount),
    ("created-at", Field::TransactionDatetime),
    ("comment", Field::ResponseMessage),
    ("response-message", Field::ResponseMessage),
    ("response-code", Field::ResponseCode),
    ("reference-number", Field::Rrn),
    ("rrn", Field::Rrn),
    ("subscription-exp-date", Field::SubscriptionExpDate),
    ("next-recurring", Field::SubscriptionExpDate),
    ("cart", Field::Cart),
    ("merchant-id", Field::MerchantId),
    ("company-id", Field::CompanyId),
    ("ip", Field::Ip),
    ("language", Field::Language),
    ("delivery", Field::Delivery),
    ("expiration-date", Field::ExpirationDate),
    ("card-entry-mode", Field::CardEntryMode),
    ("card-member-authentication", Field::CardMemberAuthentication),
    ("card-present", Field::CardPresent),
    ("cardholder-present", Field::CardholderPresent),
];

/// Name table of one success shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    shape: &'static str,
    groups: [&'static [(&'static str, Field)]; 2],
}

impl FieldTable {
    /// Table for `trans-status` responses.
    pub const TRANS_STATUS: Self = Self { shape: "trans-status", groups: [COMMON, TRANS_STATUS_ONLY] };

    /// Table for `order` responses.
    pub const ORDER: Self = Self { shape: "order", groups: [COMMON, ORDER_ONLY] };

    /// Iterates `(element name, field)` pairs in priority order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, Field)> + '_ {
        self.groups.iter().flat_map(|group| group.iter().copied())
    }

    /// Returns true if `element` is a known source in this table.
    #[must_use]
    pub fn knows(&self, element: &str) -> bool {
        self.entries().any(|(source, _)| source == element)
    }

    /// Extracts the canonical fields present under `root`.
    #[must_use]
    pub fn extract(&self, root: &XmlElement) -> BTreeMap<Field, String> {
        let mut fields = BTreeMap::new();
        for (source, field) in self.entries() {
            if let Some(text) = root.child_text(source) {
                fields.entry(field).or_insert_with(|| text.to_owned());
            }
        }

        for child in root.children.iter().filter(|child| !self.knows(&child.name)) {
            debug!(shape = self.shape, element = %child.name, "ignoring unmapped element");
        }

        fields
    }
}
