//! Server-operation hashes.
//!
//! Every server-to-server request carries `hash = SHA1(secret + order_number +
//! store_id + extra)`, hex encoded in lowercase. The extra fields depend on the
//! operation and are appended in a fixed order:
//!
//! | Operation | Extra fields |
//! |---|---|
//! | status | `currency_code + timestamp + version` |
//! | complete, refund | none |
//! | next subscription payment | `version` |
//! | next subscription payment, new amount | `version + new_amount + currency` |

use sha1::{Digest, Sha1};

/// Operation-specific hash recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashRecipe<'a> {
    /// Transaction status check.
    Status {
        /// Numeric ISO 4217 currency code (e.g. "978").
        currency_code: &'a str,
        /// Request timestamp as sent in the form.
        timestamp: &'a str,
        /// API version as sent in the form.
        version: &'a str,
    },
    /// Capture of a preauthorized transaction.
    Complete,
    /// Refund of a completed transaction.
    Refund,
    /// Next subscription charge at the original amount.
    NextSubscriptionPayment {
        /// API version as sent in the form.
        version: &'a str,
    },
    /// Next subscription charge at a new amount.
    NextSubscriptionPaymentWithAmount {
        /// API version as sent in the form.
        version: &'a str,
        /// New amount as sent in the form.
        new_amount: &'a str,
        /// Alphabetic currency code as sent in the form.
        currency: &'a str,
    },
}

impl HashRecipe<'_> {
    /// Returns the fields appended after `secret + order_number + store_id`, in order.
    #[must_use]
    pub fn extra_fields(&self) -> Vec<&str> {
        match *self {
            Self::Status { currency_code, timestamp, version } => {
                vec![currency_code, timestamp, version]
            }
            Self::Complete | Self::Refund => Vec::new(),
            Self::NextSubscriptionPayment { version } => vec![version],
            Self::NextSubscriptionPaymentWithAmount { version, new_amount, currency } => {
                vec![version, new_amount, currency]
            }
        }
    }

    /// Computes the lowercase hex SHA-1 digest for a request.
    ///
    /// # Examples
    ///
    /// ```
    /// use corvuspay::signature::HashRecipe;
    ///
    /// let hash = HashRecipe::Complete.digest("test-secret-key", "ORD1", "1000000");
    /// assert_eq!(hash, "299b656c6b783401e02a8f00b5cf456d62708a6b");
    /// ```
    #[must_use]
    pub fn digest(&self, secret: &str, order_number: &str, store_id: &str) -> String {
        let mut hasher = Sha1::new();
        hasher.update(secret.as_bytes());
        hasher.update(order_number.as_bytes());
        hasher.update(store_id.as_bytes());
        for field in self.extra_fields() {
            hasher.update(field.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
