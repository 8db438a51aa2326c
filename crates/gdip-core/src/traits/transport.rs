// # Transport Trait
//
// Defines the interface the protocol session uses to reach the service.
//
// ## Implementations
//
// - HTTP (reqwest): `gdip-transport-http` crate
// - Test doubles: scripted transports in `gdip-core/tests/common`
//
// ## Usage
//
// ```rust,ignore
// use gdip_core::Transport;
//
// let body = transport.get("http://gnudip.example.net/gnudip/cgi-bin/gdipupdt.cgi").await?;
// let tags = gdip_core::parser::parse(&body)?;
// ```

use async_trait::async_trait;

/// Trait for transport implementations
///
/// A transport performs a single GET and hands back the raw response body.
/// It holds no protocol state: every call is independent, and the session
/// decides what to request next.
///
/// # Failure
///
/// Anything that prevents a complete response (connection refused, timeout,
/// body read failure) must be reported as [`crate::Error::Transport`]. An
/// HTTP error status is not a failure by itself: the body is still returned
/// and the session decides from its tags. Transports must not retry; retry
/// policy belongs to whoever drives the [`crate::Updater`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url` and return the full response body
    ///
    /// `url` already contains the query string, if any. Implementations must
    /// not re-encode values that are already valid in a query; an HTTP client
    /// may still percent-encode characters a URL cannot carry literally.
    async fn get(&self, url: &str) -> Result<Vec<u8>, crate::Error>;

    /// Get the transport name (for logging/debugging)
    fn transport_name(&self) -> &'static str;
}
