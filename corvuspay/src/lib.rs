//! CorvusPay: client for the CorvusPay card-payment gateway
//!
//! Talks to the gateway's server-to-server API over mutual TLS and turns its XML
//! replies into typed results.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  gateway::*      │  check_status, complete, refund, next_subscription_payment
//! └────────┬─────────┘
//!          │ SignedRequest (store_id, order_number, ..., hash)
//! ┌────────▼─────────┐
//! │  signature       │  SHA-1 request hashes, HMAC-SHA256 form signatures
//! └────────┬─────────┘
//!          │ application/x-www-form-urlencoded
//! ┌────────▼─────────┐
//! │  transport       │  HTTPS with a client certificate, body returned for any status
//! └────────┬─────────┘
//!          │ XML text
//! ┌────────▼─────────┐
//! │  response        │  errors / order / trans-status / unrecognized
//! └──────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use corvuspay::{
//!     OperationResult,
//!     config::{ClientIdentity, GatewayConfig},
//!     gateway::{StatusParams, check_status},
//!     transport::MtlsTransport,
//! };
//!
//! # async fn example() -> corvuspay::Result<()> {
//! let config = GatewayConfig::new("1000000").with_secret_key("shared-secret");
//! let identity = ClientIdentity::from_files("client.crt", "client.key")?;
//! let transport = MtlsTransport::new(&identity, &config.http)?;
//!
//! match check_status(&transport, &config, StatusParams::new("ORD1", "978")).await? {
//!     OperationResult::Success(record) => println!("status: {:?}", record.status),
//!     OperationResult::Failure(error) => println!("declined: {:?}", error.description),
//!     OperationResult::Unrecognized(tree) => println!("unexpected <{}>", tree.name),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Checkout Redirects
//!
//! The hosted checkout page is reached from the cardholder's browser. Build and
//! sign the form server-side with [`forms::CheckoutForm`] and serve its HTML.
//!
//! # Error Handling
//!
//! Gateway business errors (declines, invalid order state) are data:
//! [`OperationResult::Failure`]. Everything that prevents a result is a
//! [`CorvusError`]:
//!
//! ```rust
//! use corvuspay::{CorvusError, config::GatewayConfig, forms::{CheckoutFields, CheckoutForm}};
//!
//! let config = GatewayConfig::new("1000000");
//! let fields = CheckoutFields::new("ORD1", "10.00", "EUR", "Coffee", "HR");
//!
//! match CheckoutForm::build(&config, &fields) {
//!     Err(CorvusError::Configuration(msg)) => eprintln!("configure a secret: {msg}"),
//!     Err(e) => eprintln!("other error: {e}"),
//!     Ok(form) => println!("{}", form.render_html()),
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and rustls"
)]

pub mod config;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod response;
pub mod signature;
pub mod transport;

pub use config::{ClientIdentity, GatewayConfig};
pub use error::{CorvusError, Result};
pub use response::{ErrorRecord, OperationResult, TransactionRecord};
