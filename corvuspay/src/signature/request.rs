//! Signed server-operation requests.

use url::form_urlencoded;

use crate::signature::HashRecipe;

/// Name of the form field carrying the server-operation hash.
pub const HASH_FIELD: &str = "hash";

/// Ordered form fields plus the hash computed over them.
///
/// Built once per operation and immutable afterwards.
///
/// # Examples
///
/// ```
/// use corvuspay::signature::{HashRecipe, SignedRequest};
///
/// let request = SignedRequest::sign(
///     "1000000",
///     "ORD1",
///     vec![],
///     HashRecipe::Refund,
///     "test-secret-key",
/// );
/// assert_eq!(request.field_names(), vec!["store_id", "order_number", "hash"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    fields: Vec<(&'static str, String)>,
}

impl SignedRequest {
    /// Signs a request.
    ///
    /// The field set is `store_id`, `order_number`, the operation-specific `extra`
    /// fields in the given order, then `hash`.
    #[must_use]
    pub fn sign(
        store_id: &str,
        order_number: &str,
        extra: Vec<(&'static str, String)>,
        recipe: HashRecipe<'_>,
        secret: &str,
    ) -> Self {
        let hash = recipe.digest(secret, order_number, store_id);

        let mut fields = Vec::with_capacity(extra.len() + 3);
        fields.push(("store_id", store_id.to_owned()));
        fields.push(("order_number", order_number.to_owned()));
        fields.extend(extra);
        fields.push((HASH_FIELD, hash));

        Self { fields }
    }

    /// Returns all fields in send order.
    #[must_use]
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    /// Returns the field names in send order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    /// Returns the value of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(field, _)| *field == name).map(|(_, value)| value.as_str())
    }

    /// Returns the computed hash.
    #[must_use]
    pub fn hash(&self) -> &str {
        self.get(HASH_FIELD).unwrap_or_default()
    }

    /// Encodes the fields as an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn to_form_body(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.fields {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_field_order() {
        let request = SignedRequest::sign(
            "1000000",
            "ORD1",
            vec![("subscription", "true".to_owned()), ("account_id", "acc-1".to_owned())],
            HashRecipe::Complete,
            "test-secret-key",
        );

        assert_eq!(
            request.field_names(),
            vec!["store_id", "order_number", "subscription", "account_id", "hash"]
        );
        assert_eq!(request.hash(), "299b656c6b783401e02a8f00b5cf456d62708a6b");
        assert_eq!(request.get("account_id"), Some("acc-1"));
        assert_eq!(request.get("missing"), None);
    }

    #[test]
    fn test_form_body_encoding() {
        let request = SignedRequest::sign(
            "1000000",
            "ORD 1&2",
            vec![("cart", "Shoes, size 42".to_owned())],
            HashRecipe::NextSubscriptionPayment { version: "1.6" },
            "k",
        );

        let body = request.to_form_body();
        assert!(body.starts_with("store_id=1000000&order_number=ORD+1%262&cart=Shoes%2C+size+42&hash="));

        let decoded: Vec<(String, String)> =
            form_urlencoded::parse(body.as_bytes()).into_owned().collect();
        assert_eq!(decoded.len(), 4);
        assert_eq!(decoded[1], ("order_number".to_owned(), "ORD 1&2".to_owned()));
    }
}
