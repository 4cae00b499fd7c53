//! HTTP transport with client certificate authentication.
//!
//! Built on reqwest with rustls. The client presents the configured certificate
//! during the handshake and verifies the gateway certificate against the bundled
//! web PKI roots.

use reqwest::{Client, Identity, header::CONTENT_TYPE};
use tracing::{debug, instrument};
use url::Url;

use super::config::HttpConfig;
use crate::{
    config::ClientIdentity,
    error::{CorvusError, Result},
    transport::{RequestContext, Transport, TransportResponse, sealed},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Validates URL for security constraints.
///
/// The gateway only accepts client certificates over HTTPS.
fn validate_url(url: &Url) -> Result<()> {
    if url.scheme() != "https" {
        return Err(CorvusError::Transport("Only HTTPS URLs are allowed".to_owned()));
    }
    if url.host_str().is_none() {
        return Err(CorvusError::Transport(format!("URL missing host: {url}")));
    }
    Ok(())
}

/// Rejects endpoint paths with traversal sequences or without a leading slash.
fn sanitize_path(path: &str) -> Result<&str> {
    if path.contains("..") || path.contains("//") {
        return Err(CorvusError::Transport(
            "Invalid path: traversal sequences not allowed".to_owned(),
        ));
    }
    if !path.starts_with('/') {
        return Err(CorvusError::Transport("Path must start with '/'".to_owned()));
    }
    Ok(path)
}

/// Form-POST transport authenticated with a TLS client certificate.
///
/// Holds a pooled client bound to one identity; build one per store and reuse it
/// across operations.
///
/// # Examples
///
/// ```rust,no_run
/// use corvuspay::{
///     config::ClientIdentity,
///     transport::{HttpConfig, MtlsTransport},
/// };
///
/// # fn example() -> corvuspay::error::Result<()> {
/// let identity = ClientIdentity::from_files("certs/store.crt", "certs/store.key")?;
/// let transport = MtlsTransport::new(&identity, &HttpConfig::default())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MtlsTransport {
    client: Client,
}

impl sealed::private::Sealed for MtlsTransport {}

impl MtlsTransport {
    /// Creates a transport presenting `identity` on every connection.
    ///
    /// # Errors
    ///
    /// Returns [`CorvusError::Configuration`] if the HTTP settings are out of bounds
    /// or the certificate/key pair is not valid PEM, and [`CorvusError::Http`] if the
    /// client cannot be built.
    pub fn new(identity: &ClientIdentity, config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let identity = Identity::from_pem(&identity.pem_bundle()).map_err(|e| {
            CorvusError::Configuration(format!("invalid client certificate or key: {e}"))
        })?;

        let client = Client::builder()
            .use_rustls_tls()
            .identity(identity)
            .https_only(true)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(CorvusError::Http)?;

        Ok(Self { client })
    }
}

impl Transport for MtlsTransport {
    #[instrument(
        skip(self, body),
        fields(base_url = ctx.base_url, path = ctx.path, body_len = body.len())
    )]
    async fn post_form<'a>(
        &'a self,
        ctx: RequestContext<'a>,
        body: &'a str,
    ) -> Result<TransportResponse> {
        let url = Url::parse(ctx.base_url)
            .map_err(|e| CorvusError::Transport(format!("invalid base_url: {e}")))?;
        validate_url(&url)?;
        let path = sanitize_path(ctx.path)?;

        let full_url = format!("{}{path}", ctx.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&full_url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body.to_owned())
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();

        // Error statuses still carry the gateway's XML error envelope.
        let text = response.text().await?;
        debug!(status, body_len = text.len(), "gateway responded");

        Ok(TransportResponse { status, body: text, headers })
    }

    fn protocol_name(&self) -> &'static str {
        "https+mtls"
    }
}
