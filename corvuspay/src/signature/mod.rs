//! Request signing.
//!
//! Two families of signatures protect gateway requests:
//!
//! - [`FormSigner`]: HMAC-SHA256 over the sorted checkout form fields, used for the
//!   hosted checkout redirect
//! - [`HashRecipe`]: SHA-1 over `secret + order_number + store_id [+ extra]`, used by
//!   every server-to-server operation and carried in [`SignedRequest`]
//!
//! Both are deterministic: no timestamps or nonces are injected here. Callers supply
//! every value that ends up in the digest.

pub mod form;
pub mod hash;
pub mod request;

pub use form::{DEFAULT_EXCLUDED_FIELDS, FormSigner, SIGNATURE_FIELD};
pub use hash::HashRecipe;
pub use request::{HASH_FIELD, SignedRequest};
