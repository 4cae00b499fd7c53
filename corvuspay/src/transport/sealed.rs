//! Sealed trait marker for Transport implementations.
//!
//! Keeps `Transport` implementations inside this crate so none can skip the
//! client certificate or disable server certificate verification.

pub(crate) mod private {
    /// Sealed trait marker.
    pub trait Sealed {}
}
