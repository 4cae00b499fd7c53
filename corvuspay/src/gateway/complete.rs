//! Capture of preauthorized transactions.

use tracing::instrument;

use crate::{
    config::GatewayConfig,
    error::Result,
    gateway::{Operation, execute, require_non_empty},
    response::OperationResult,
    signature::{HashRecipe, SignedRequest},
    transport::Transport,
};

/// Completes (captures) a preauthorized transaction.
///
/// # Errors
///
/// Returns [`CorvusError::Configuration`](crate::error::CorvusError::Configuration)
/// without a secret and [`CorvusError::InvalidInput`](crate::error::CorvusError::InvalidInput)
/// for an empty order number; otherwise see [`crate::gateway`].
#[instrument(
    skip(transport, config),
    fields(store_id = %config.store_id, operation = "complete")
)]
pub async fn complete<T: Transport>(
    transport: &T,
    config: &GatewayConfig,
    order_number: &str,
) -> Result<OperationResult> {
    let secret = config.require_secret()?;
    require_non_empty("order_number", order_number)?;

    let request =
        SignedRequest::sign(&config.store_id, order_number, vec![], HashRecipe::Complete, secret.expose());

    execute(transport, config, Operation::Complete, &request).await
}

/// Completes a preauthorized subscription transaction.
///
/// Adds `subscription=true` and `account_id`; the hash is the same as for
/// [`complete`].
///
/// # Errors
///
/// As [`complete`], plus [`CorvusError::InvalidInput`](crate::error::CorvusError::InvalidInput)
/// for an empty account id.
#[instrument(
    skip(transport, config),
    fields(store_id = %config.store_id, operation = "complete_subscription")
)]
pub async fn complete_subscription<T: Transport>(
    transport: &T,
    config: &GatewayConfig,
    order_number: &str,
    account_id: &str,
) -> Result<OperationResult> {
    let secret = config.require_secret()?;
    require_non_empty("order_number", order_number)?;
    require_non_empty("account_id", account_id)?;

    let request = SignedRequest::sign(
        &config.store_id,
        order_number,
        vec![("subscription", "true".to_owned()), ("account_id", account_id.to_owned())],
        HashRecipe::Complete,
        secret.expose(),
    );

    execute(transport, config, Operation::Complete, &request).await
}
