//! Error types for the GnuDIP client
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for GnuDIP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the GnuDIP client
///
/// Transport and parse errors abort the current update cycle only.
/// Configuration errors are raised before any network activity.
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP-layer failure reaching or reading from the service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded as markup at all
    #[error("Parse error: {0}")]
    Parse(String),

    /// The service rejected the credentials (retc = 1)
    #[error("Invalid login (or other problem)")]
    InvalidLogin,

    /// The service answered with a return code this client does not know
    #[error("Unknown return code: {0:?}")]
    UnknownReturnCode(String),

    /// Invalid or missing settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unknown return code error
    pub fn unknown_return_code(code: impl Into<String>) -> Self {
        Self::UnknownReturnCode(code.into())
    }

    /// Well-formed response that the service rejected or that we could not interpret
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::InvalidLogin | Self::UnknownReturnCode(_))
    }

    /// Failure of the exchange itself (the cycle never got a usable answer)
    pub fn is_exchange_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Parse(_))
    }
}
