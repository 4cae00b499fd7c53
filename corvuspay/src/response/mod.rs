//! XML response normalization.
//!
//! Every gateway operation answers with one XML document. The root element
//! decides its shape:
//!
//! | Root | Shape | Result |
//! |---|---|---|
//! | `errors` | business error | [`OperationResult::Failure`] |
//! | `order` | capture, refund and subscription responses | [`OperationResult::Success`] |
//! | `trans-status` | status check responses | [`OperationResult::Success`] |
//! | anything else | unknown | [`OperationResult::Unrecognized`] |
//!
//! Malformed documents are always a [`CorvusError::Parse`](crate::error::CorvusError::Parse)
//! and never produce a result.

pub mod descriptions;
pub mod fields;
pub mod record;
pub mod xml;

use std::collections::BTreeMap;

pub use descriptions::{Locale, TransactionDescriptions};
pub use record::{
    CaptureDetails, CardDetails, Cardholder, ErrorDetail, ErrorRecord, OperationResult,
    TransactionRecord,
};
use tracing::warn;
pub use xml::XmlElement;

use crate::{
    error::Result,
    response::fields::{Field, FieldTable},
};

/// Known response envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `<errors>` business error envelope.
    Errors,
    /// `<order>` capture, refund or subscription response.
    Order,
    /// `<trans-status>` status response.
    TransStatus,
    /// Anything else.
    Unrecognized,
}

impl ResponseShape {
    /// Classifies a document by its root element name.
    #[must_use]
    pub fn of(root: &XmlElement) -> Self {
        match root.name.as_str() {
            "errors" => Self::Errors,
            "order" => Self::Order,
            "trans-status" => Self::TransStatus,
            _ => Self::Unrecognized,
        }
    }
}

/// Parses and normalizes one response body.
///
/// # Errors
///
/// Returns [`CorvusError::Parse`](crate::error::CorvusError::Parse) if `body` is
/// not well-formed XML.
///
/// # Examples
///
/// ```
/// use corvuspay::response::{OperationResult, normalize};
///
/// let result = normalize("<trans-status><order-number>ORD1</order-number></trans-status>")?;
/// let OperationResult::Success(record) = result else { panic!("expected success") };
/// assert_eq!(record.order_number.as_deref(), Some("ORD1"));
/// # Ok::<(), corvuspay::error::CorvusError>(())
/// ```
pub fn normalize(body: &str) -> Result<OperationResult> {
    xml::parse_document(body).map(normalize_document)
}

/// Normalizes an already parsed document.
#[must_use]
pub fn normalize_document(root: XmlElement) -> OperationResult {
    match ResponseShape::of(&root) {
        ResponseShape::Errors => OperationResult::Failure(error_record(&root)),
        ResponseShape::Order => OperationResult::Success(order_record(&root)),
        ResponseShape::TransStatus => {
            OperationResult::Success(TransactionRecord::from_fields(FieldTable::TRANS_STATUS.extract(&root)))
        }
        ResponseShape::Unrecognized => {
            warn!(root = %root.name, "unrecognized gateway response shape");
            OperationResult::Unrecognized(root)
        }
    }
}

fn order_record(root: &XmlElement) -> TransactionRecord {
    let mut fields = FieldTable::ORDER.extract(root);
    fields.entry(Field::Status).or_insert_with(|| "completed".to_owned());
    fields.entry(Field::ResponseCode).or_insert_with(|| "0".to_owned());
    TransactionRecord::from_fields(fields)
}

/// Reads an `errors` envelope.
///
/// The description, action and detail may sit directly under `errors` or inside
/// any `error` child; direct children take precedence. Message text carried by
/// `errors` itself and by each `error` element is kept in document order, and the
/// first message stands in for a missing `description`.
fn error_record(root: &XmlElement) -> ErrorRecord {
    let errors: Vec<&XmlElement> = root.children.iter().filter(|el| el.name == "error").collect();
    let lookup = |name: &str| {
        root.child(name).or_else(|| errors.iter().find_map(|error| error.child(name)))
    };
    let text = |name: &str| lookup(name).map(|el| el.text.clone()).filter(|t| !t.is_empty());

    let detail = if let Some(order) = lookup("order") {
        ErrorDetail::Order(snapshot(order))
    } else if let Some(states) = lookup("valid-order-states").or_else(|| lookup("valid-states")) {
        ErrorDetail::ValidStates(valid_states(states))
    } else {
        ErrorDetail::None
    };

    let messages: Vec<String> = std::iter::once(root)
        .chain(errors.iter().copied())
        .map(|el| el.text.trim())
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
        .collect();
    let description = text("description").or_else(|| messages.first().cloned());

    ErrorRecord { description, action: text("action"), messages, detail }
}

fn snapshot(order: &XmlElement) -> BTreeMap<String, String> {
    order
        .children
        .iter()
        .filter(|child| !child.text.is_empty())
        .map(|child| (child.name.clone(), child.text.clone()))
        .collect()
}

fn valid_states(states: &XmlElement) -> Vec<String> {
    if states.children.is_empty() {
        states
            .text
            .split(',')
            .map(str::trim)
            .filter(|state| !state.is_empty())
            .map(str::to_owned)
            .collect()
    } else {
        states
            .children
            .iter()
            .filter(|child| !child.text.is_empty())
            .map(|child| child.text.clone())
            .collect()
    }
}
