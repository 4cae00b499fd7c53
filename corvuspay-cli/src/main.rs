//! `corvuspay`: run CorvusPay gateway operations from the command line.
//!
//! Server operations print the normalized result as JSON on stdout. The form
//! commands print a signed, auto-submitting HTML form.
//!
//! Exit codes: `0` success, `1` error, `2` gateway business error,
//! `3` unrecognized gateway response.

mod observability;

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use corvuspay::{
    ClientIdentity, CorvusError, GatewayConfig, OperationResult, Result,
    forms::{CheckoutFields, CheckoutForm, RefundForm},
    gateway::{self, NewAmount, NextPaymentParams, StatusParams},
    transport::MtlsTransport,
};
use observability::{LogFormat, init_logging};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file. Without it, configuration is read from
    /// CORVUS_STORE_ID, CORVUS_SECRET_KEY, CORVUS_API and CORVUS_CHECKOUT_URL.
    #[arg(long, short, env = "CORVUS_CONFIG")]
    config: Option<PathBuf>,

    /// PEM client certificate.
    #[arg(long, env = "CORVUS_CERT_PATH")]
    cert: Option<PathBuf>,

    /// PEM client private key.
    #[arg(long, env = "CORVUS_KEY_PATH")]
    key: Option<PathBuf>,

    /// Log output format (defaults to LOG_FORMAT, then pretty).
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check the status of a transaction.
    Status {
        /// Order number.
        order_number: String,
        /// Numeric ISO 4217 currency code.
        #[arg(long, default_value = "978")]
        currency_code: String,
        /// Request timestamp (default: today, UTC).
        #[arg(long)]
        timestamp: Option<String>,
        /// API version.
        #[arg(long)]
        version: Option<String>,
    },
    /// Capture a preauthorized transaction.
    Complete {
        /// Order number.
        order_number: String,
        /// Subscription account id; completes a subscription transaction.
        #[arg(long)]
        account_id: Option<String>,
    },
    /// Refund a completed transaction.
    Refund {
        /// Order number.
        order_number: String,
    },
    /// Charge the next payment of a subscription.
    NextPayment {
        /// New order number for this charge.
        order_number: String,
        /// Subscription account id.
        account_id: String,
        /// Charge this amount instead of the original one (requires --currency).
        #[arg(long, requires = "currency")]
        amount: Option<String>,
        /// Alphabetic ISO 4217 currency code for --amount.
        #[arg(long, requires = "amount")]
        currency: Option<String>,
        /// Cart description.
        #[arg(long)]
        cart: Option<String>,
    },
    /// Print a signed hosted-checkout form.
    CheckoutForm {
        /// Order number.
        order_number: String,
        /// Amount, e.g. 100.00.
        amount: String,
        /// Cart description.
        cart: String,
        /// Alphabetic ISO 4217 currency code.
        #[arg(long, default_value = "EUR")]
        currency: String,
        /// Cardholder country code.
        #[arg(long, default_value = "HR")]
        country_code: String,
        /// Checkout page language.
        #[arg(long, default_value = "en")]
        language: String,
        /// Authorize only; capture later with `complete`.
        #[arg(long)]
        require_complete: bool,
    },
    /// Print a signed browser refund form.
    RefundForm {
        /// Order number.
        order_number: String,
    },
}

impl Command {
    const fn name(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Complete { .. } => "complete",
            Self::Refund { .. } => "refund",
            Self::NextPayment { .. } => "next-payment",
            Self::CheckoutForm { .. } => "checkout-form",
            Self::RefundForm { .. } => "refund-form",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(
        cli.log_format.unwrap_or_else(LogFormat::from_env),
        if cli.verbose { "debug" } else { "info" },
    );

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    info!(command = cli.command.name(), store_id = %config.store_id, "starting");

    let result = match cli.command {
        Command::CheckoutForm {
            order_number,
            amount,
            cart,
            currency,
            country_code,
            language,
            require_complete,
        } => {
            let mut fields = CheckoutFields::new(order_number, amount, currency, cart, country_code);
            fields.language = language;
            fields.require_complete = require_complete;
            print!("{}", CheckoutForm::build(&config, &fields)?.render_html());
            return Ok(ExitCode::SUCCESS);
        }
        Command::RefundForm { order_number } => {
            print!("{}", RefundForm::build(&config, &order_number)?.render_html());
            return Ok(ExitCode::SUCCESS);
        }
        command => {
            let identity = load_identity(cli.cert, cli.key)?;
            let transport = MtlsTransport::new(&identity, &config.http)?;
            execute(&transport, &config, command).await?
        }
    };

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| CorvusError::InvalidInput(format!("cannot serialize result: {e}")))?;
    println!("{json}");

    Ok(match result {
        OperationResult::Success(_) => ExitCode::SUCCESS,
        OperationResult::Failure(_) => ExitCode::from(2),
        OperationResult::Unrecognized(_) => ExitCode::from(3),
    })
}

async fn execute(
    transport: &MtlsTransport,
    config: &GatewayConfig,
    command: Command,
) -> Result<OperationResult> {
    match command {
        Command::Status { order_number, currency_code, timestamp, version } => {
            let params = StatusParams { order_number, currency_code, timestamp, version };
            gateway::check_status(transport, config, params).await
        }
        Command::Complete { order_number, account_id: Some(account_id) } => {
            gateway::complete_subscription(transport, config, &order_number, &account_id).await
        }
        Command::Complete { order_number, account_id: None } => {
            gateway::complete(transport, config, &order_number).await
        }
        Command::Refund { order_number } => gateway::refund(transport, config, &order_number).await,
        Command::NextPayment { order_number, account_id, amount, currency, cart } => {
            let params = NextPaymentParams {
                cart,
                new_amount: amount.zip(currency).map(|(amount, currency)| NewAmount { amount, currency }),
                ..NextPaymentParams::new(order_number, account_id)
            };
            gateway::next_subscription_payment(transport, config, params).await
        }
        Command::CheckoutForm { .. } | Command::RefundForm { .. } => Err(CorvusError::InvalidInput(
            "form commands do not contact the gateway".to_owned(),
        )),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<GatewayConfig> {
    match path {
        Some(path) => GatewayConfig::from_file(path),
        None => GatewayConfig::from_env(),
    }
}

fn load_identity(cert: Option<PathBuf>, key: Option<PathBuf>) -> Result<ClientIdentity> {
    match (cert, key) {
        (Some(cert), Some(key)) => ClientIdentity::from_files(cert, key),
        _ => Err(CorvusError::Configuration(
            "gateway operations need --cert and --key (or CORVUS_CERT_PATH and CORVUS_KEY_PATH)"
                .to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["corvuspay", "status", "ORD1", "--timestamp", "2024-01-15"])
            .unwrap();
        let Command::Status { order_number, currency_code, timestamp, version } = cli.command else {
            panic!("expected status command");
        };
        assert_eq!(order_number, "ORD1");
        assert_eq!(currency_code, "978");
        assert_eq!(timestamp.as_deref(), Some("2024-01-15"));
        assert!(version.is_none());
    }

    #[test]
    fn test_next_payment_amount_requires_currency() {
        let result =
            Cli::try_parse_from(["corvuspay", "next-payment", "ORD2", "acc-1", "--amount", "9.99"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "corvuspay", "next-payment", "ORD2", "acc-1", "--amount", "9.99", "--currency", "EUR",
        ])
        .unwrap();
        assert_eq!(cli.command.name(), "next-payment");
    }

    #[test]
    fn test_missing_identity_is_configuration_error() {
        let err = load_identity(Some(PathBuf::from("client.crt")), None).unwrap_err();
        assert!(matches!(err, CorvusError::Configuration(_)));
    }
}
