//! Checkout form signatures.
//!
//! The hosted checkout page authenticates a submitted form with
//! `HMAC-SHA256(secret, key1 + value1 + key2 + value2 + ...)`, keys sorted
//! lexicographically, hex encoded in lowercase. A fixed set of fields is left out
//! of the signed payload; `signature` is always among them.

use std::collections::BTreeSet;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::instrument;

use crate::error::{CorvusError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Name of the form field carrying the signature.
pub const SIGNATURE_FIELD: &str = "signature";

/// Fields excluded from the signed payload by default.
pub const DEFAULT_EXCLUDED_FIELDS: [&str; 3] = [SIGNATURE_FIELD, "cardholder_state", "cardholder_phone"];

/// Computes checkout form signatures over a configurable exclusion set.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use corvuspay::signature::FormSigner;
///
/// let mut fields = BTreeMap::new();
/// fields.insert("order_number".to_owned(), "ORD1".to_owned());
/// fields.insert("amount".to_owned(), "100.00".to_owned());
/// fields.insert("cardholder_phone".to_owned(), "+385123".to_owned());
///
/// let signer = FormSigner::default();
/// assert_eq!(signer.signing_payload(&fields), "amount100.00order_numberORD1");
/// ```
#[derive(Debug, Clone)]
pub struct FormSigner {
    excluded: BTreeSet<String>,
}

impl Default for FormSigner {
    fn default() -> Self {
        Self::with_exclusions(DEFAULT_EXCLUDED_FIELDS)
    }
}

impl FormSigner {
    /// Creates a signer excluding `signature` plus the given fields.
    #[must_use]
    pub fn with_exclusions<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut excluded: BTreeSet<String> = fields.into_iter().map(Into::into).collect();
        excluded.insert(SIGNATURE_FIELD.to_owned());
        Self { excluded }
    }

    /// Returns true if `field` is left out of the signed payload.
    #[must_use]
    pub fn is_excluded(&self, field: &str) -> bool {
        self.excluded.contains(field)
    }

    /// Builds the string that gets signed.
    ///
    /// Accepts any iterable of key/value pairs; ordering of the input is irrelevant.
    #[must_use]
    pub fn signing_payload<'a, I>(&self, fields: I) -> String
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut pairs: Vec<(&String, &String)> =
            fields.into_iter().filter(|(key, _)| !self.is_excluded(key)).collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));

        pairs.into_iter().fold(String::new(), |mut payload, (key, value)| {
            payload.push_str(key);
            payload.push_str(value);
            payload
        })
    }

    /// Signs `fields` with the shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Signature`] if the MAC cannot be keyed. HMAC accepts
    /// keys of any length, so this does not happen for string secrets.
    #[instrument(skip(self, fields, secret))]
    pub fn sign<'a, I>(&self, fields: I, secret: &str) -> Result<String>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let payload = self.signing_payload(fields);
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| CorvusError::Signature(format!("invalid HMAC key: {e}")))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
