// # HTTP Transport
//
// This crate provides the HTTP transport for the GnuDIP client.
//
// ## Behavior
//
// - One plain GET per call, no body, no custom headers beyond User-Agent
// - A single `reqwest::Client` is reused, so connections may be pooled
// - The body is returned whatever the status; GnuDIP servers may reject a
//   login with a non-2xx page that still carries `retc`
// - Connection failures, timeouts and body read failures are transport errors
// - No retries (owned by whoever drives the `Updater`)
//
// The URL handed in already carries the GnuDIP query string. reqwest parses
// it with the `url` crate, which percent-encodes characters that may not
// appear in a query (space, `"`, `<`, `>`); everything else is sent as given.

use async_trait::async_trait;
use gdip_core::traits::Transport;
use gdip_core::{Error, Result};
use std::time::Duration;

/// Default HTTP timeout for each request (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("gdipwebc/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client (pooled connections)
    client: reqwest::Client,

    /// Per-request timeout
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a transport with a custom per-request timeout
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the HTTP client cannot be built (e.g. the TLS
    /// backend fails to initialize).
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // The URL carries `pass=`, so only the status is logged
            tracing::debug!("HTTP status {}, reading body anyway", status);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        tracing::trace!("received {} byte(s) with status {}", body.len(), status);
        Ok(body.to_vec())
    }

    fn transport_name(&self) -> &'static str {
        "http"
    }
}
