//! Data carried between and out of the protocol exchanges

use crate::error::{Error, Result};
use std::fmt;

/// Server-issued challenge from the first exchange
///
/// All three values are opaque and relayed verbatim in the second request.
/// A challenge belongs to exactly one cycle; the salt must never be reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeMaterial {
    pub salt: String,
    pub time: String,
    pub sign: String,
}

/// Interpreted `retc` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnCode {
    /// `"0"`: the domain now points at the resolved address
    Success,
    /// `"1"`: credentials rejected
    InvalidLogin,
    /// `"2"`: the domain was taken offline
    WentOffline,
    /// Anything else, kept raw
    Unknown(String),
}

impl ReturnCode {
    /// Map a wire value; unrecognized values become [`ReturnCode::Unknown`]
    pub fn from_wire(retc: &str) -> Self {
        match retc {
            "0" => ReturnCode::Success,
            "1" => ReturnCode::InvalidLogin,
            "2" => ReturnCode::WentOffline,
            other => ReturnCode::Unknown(other.to_string()),
        }
    }

    /// Success and WentOffline both complete the requested update
    pub fn is_success(&self) -> bool {
        matches!(self, ReturnCode::Success | ReturnCode::WentOffline)
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnCode::Success => f.write_str("success"),
            ReturnCode::InvalidLogin => f.write_str("invalid login"),
            ReturnCode::WentOffline => f.write_str("went offline"),
            ReturnCode::Unknown(raw) => write!(f, "unknown ({:?})", raw),
        }
    }
}

/// Result of a completed exchange
///
/// Produced for every well-formed answer, including rejections. Transport
/// and parse failures never get this far; they surface as `Err` from the
/// session instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub code: ReturnCode,
    /// Address the domain now resolves to; empty unless `code` is Success
    pub address: String,
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Resolved address, if there is one
    pub fn address(&self) -> Option<&str> {
        if self.address.is_empty() {
            None
        } else {
            Some(&self.address)
        }
    }

    /// Turn protocol rejections into errors
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLogin`] for retc 1, [`Error::UnknownReturnCode`] for
    /// unrecognized codes. WentOffline passes through.
    pub fn ensure_success(self) -> Result<Self> {
        match &self.code {
            ReturnCode::Success | ReturnCode::WentOffline => Ok(self),
            ReturnCode::InvalidLogin => Err(Error::InvalidLogin),
            ReturnCode::Unknown(raw) => Err(Error::unknown_return_code(raw.clone())),
        }
    }
}
