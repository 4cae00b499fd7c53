//! Canonical result types.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::response::{descriptions::TransactionDescriptions, fields::Field, xml::XmlElement};

/// Card metadata reported for a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardDetails {
    /// Card brand, e.g. `visa` or `master`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    /// Masked PAN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_number: Option<String>,
    /// Number of installments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installments_number: Option<String>,
}

/// Cardholder name, address and contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs, reason = "fields mirror the gateway's cardholder-* elements")]
pub struct Cardholder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

/// Fields only reported on capture (`order`) responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs, reason = "fields mirror the gateway's order elements")]
pub struct CaptureDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_entry_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_member_authentication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_present: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_present: Option<String>,
}

/// Canonical transaction record.
///
/// Every field is optional: the gateway omits whatever does not apply to the
/// operation. Values are copied from the response without reformatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    /// Merchant order number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    /// Transaction amount as a decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Transaction timestamp as reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_datetime: Option<String>,
    /// Transaction status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Human-readable response message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
    /// Gateway response code; `0` means approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    /// Numeric ISO 4217 currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    /// Card metadata.
    pub card: CardDetails,
    /// Cardholder details.
    pub cardholder: Cardholder,
    /// Retrieval reference number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrn: Option<String>,
    /// Authorization approval code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_code: Option<String>,
    /// Acquirer identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquirer_code: Option<String>,
    /// Raw transaction type code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    /// Localized descriptions; present whenever `transaction_type` is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptions: Option<TransactionDescriptions>,
    /// Secondary merchant order number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_order_number: Option<String>,
    /// Subscription expiry or next recurring date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_exp_date: Option<String>,
    /// Stored payment method identifier for subscription charges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Capture-only details; `None` unless at least one was reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture: Option<CaptureDetails>,
}

impl TransactionRecord {
    /// Builds a record from extracted fields.
    #[must_use]
    pub fn from_fields(mut fields: BTreeMap<Field, String>) -> Self {
        let mut take = |field: Field| fields.remove(&field);

        let transaction_type = take(Field::TransactionType);
        let descriptions = transaction_type.as_deref().map(TransactionDescriptions::for_code);

        let capture = CaptureDetails {
            cart: take(Field::Cart),
            merchant_id: take(Field::MerchantId),
            company_id: take(Field::CompanyId),
            ip: take(Field::Ip),
            language: take(Field::Language),
            delivery: take(Field::Delivery),
            expiration_date: take(Field::ExpirationDate),
            card_entry_mode: take(Field::CardEntryMode),
            card_member_authentication: take(Field::CardMemberAuthentication),
            card_present: take(Field::CardPresent),
            cardholder_present: take(Field::CardholderPresent),
        };

        Self {
            order_number: take(Field::OrderNumber),
            amount: take(Field::Amount),
            transaction_datetime: take(Field::TransactionDatetime),
            status: take(Field::Status),
            response_message: take(Field::ResponseMessage),
            response_code: take(Field::ResponseCode),
            currency_code: take(Field::CurrencyCode),
            card: CardDetails {
                card_type: take(Field::CardType),
                masked_number: take(Field::CardMaskedNumber),
                installments_number: take(Field::InstallmentsNumber),
            },
            cardholder: Cardholder {
                name: take(Field::CardholderName),
                surname: take(Field::CardholderSurname),
                address: take(Field::CardholderAddress),
                city: take(Field::CardholderCity),
                zip_code: take(Field::CardholderZipCode),
                email: take(Field::CardholderEmail),
                phone: take(Field::CardholderPhone),
                country: take(Field::CardholderCountry),
                country_code: take(Field::CardholderCountryCode),
            },
            rrn: take(Field::Rrn),
            approval_code: take(Field::ApprovalCode),
            acquirer_code: take(Field::AcquirerCode),
            transaction_type,
            descriptions,
            additional_order_number: take(Field::AdditionalOrderNumber),
            subscription_exp_date: take(Field::SubscriptionExpDate),
            account_id: take(Field::AccountId),
            capture: (capture != CaptureDetails::default()).then_some(capture),
        }
    }

    /// Returns true if the gateway reported response code `0`.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.response_code.as_deref() == Some("0")
    }
}

/// What accompanies an error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDetail {
    /// Snapshot of the order the request referred to, keyed by element name.
    Order(BTreeMap<String, String>),
    /// Order states in which the requested operation would have been accepted.
    ValidStates(Vec<String>),
    /// Neither was reported.
    None,
}

/// Business error reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    /// What went wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Suggested remedial action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Message texts of the envelope and each `error` element, in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
    /// Order snapshot or valid states.
    pub detail: ErrorDetail,
}

/// Outcome of one gateway operation.
///
/// Exactly one variant is produced per response document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum OperationResult {
    /// A recognized success shape, fully mapped.
    Success(TransactionRecord),
    /// The gateway returned an error envelope.
    Failure(ErrorRecord),
    /// Well-formed XML matching no known envelope; carries the parsed tree.
    Unrecognized(XmlElement),
}

impl OperationResult {
    /// Returns true for [`OperationResult::Success`] and
    /// [`OperationResult::Unrecognized`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failure(_))
    }

    /// Returns true only for a recognized, fully mapped success.
    #[must_use]
    pub const fn is_fully_mapped(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the transaction record, if this is a recognized success.
    #[must_use]
    pub const fn record(&self) -> Option<&TransactionRecord> {
        match self {
            Self::Success(record) => Some(record),
            Self::Failure(_) | Self::Unrecognized(_) => None,
        }
    }

    /// Returns the error record, if the gateway reported one.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorRecord> {
        match self {
            Self::Failure(error) => Some(error),
            Self::Success(_) | Self::Unrecognized(_) => None,
        }
    }
}
