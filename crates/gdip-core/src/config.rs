//! Configuration types for the GnuDIP client
//!
//! Two layers:
//! - [`ClientSettings`]: what a configuration source (CLI, environment, file)
//!   provides, including the plaintext password and the update interval.
//! - [`ClientConfig`]: the validated, immutable view the protocol session
//!   works from. The plaintext password is hashed on construction and
//!   dropped.

use crate::digest;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

/// What an update cycle asks the service to do
///
/// The discriminants are the wire `reqc` values. The set is closed: the
/// protocol has no way to negotiate further codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// Bind the domain to an explicit address (address required)
    Register = 0,
    /// Take the domain offline
    Offline = 1,
    /// Bind the domain to the address the server sees the request from
    RegisterPassive = 2,
}

impl RequestMode {
    /// The `reqc` value sent on the wire
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestMode::Register => "register",
            RequestMode::Offline => "offline",
            RequestMode::RegisterPassive => "register-passive",
        };
        f.write_str(s)
    }
}

/// Validated client configuration
///
/// Immutable once constructed. A daemon builds it once and shares it across
/// all update cycles.
#[derive(Clone)]
pub struct ClientConfig {
    endpoint: String,
    user: String,
    /// `md5_hex(plaintext)`, never logged
    password_hash: String,
    domain_name: String,
    mode: RequestMode,
    address: Option<String>,
}

// Custom Debug implementation that hides the password hash
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("password_hash", &"<REDACTED>")
            .field("domain_name", &self.domain_name)
            .field("mode", &self.mode)
            .field("address", &self.address)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new client configuration
    ///
    /// # Parameters
    ///
    /// - `endpoint`: URL of the GnuDIP update CGI (`http://` or `https://`)
    /// - `user`: user name at the service
    /// - `password`: plaintext password, hashed here and not retained
    /// - `domain_name`: domain to update
    /// - `mode`: request mode for every cycle
    /// - `address`: literal address; required for [`RequestMode::Register`],
    ///   otherwise only kept for display
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if a required value is empty, the endpoint has no
    /// HTTP scheme, or REGISTER is requested without an address.
    pub fn new(
        endpoint: impl Into<String>,
        user: impl Into<String>,
        password: &str,
        domain_name: impl Into<String>,
        mode: RequestMode,
        address: Option<String>,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        let user = user.into();
        let domain_name = domain_name.into();
        let address = address.filter(|a| !a.is_empty());

        if endpoint.is_empty() {
            return Err(Error::config("URL of the service must be specified"));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(Error::config(format!(
                "URL of the service must use HTTP or HTTPS scheme. Got: {}",
                endpoint
            )));
        }
        if user.is_empty() {
            return Err(Error::config("User name must be specified"));
        }
        if password.is_empty() {
            return Err(Error::config("Password must be specified"));
        }
        if domain_name.is_empty() {
            return Err(Error::config("Domain name must be specified"));
        }
        if mode == RequestMode::Register && address.is_none() {
            return Err(Error::config(
                "IP address must be specified when the request mode is register",
            ));
        }

        Ok(Self {
            endpoint,
            user,
            password_hash: digest::password_hash(password),
            domain_name,
            mode,
            address,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Hash of the plaintext password (input to every challenge response)
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Configured literal address, if any
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

/// Settings as supplied by a configuration source
///
/// Field names double as the long CLI flag names and the suffixes of the
/// `GDIPWEBC_*` environment variables.
#[derive(Clone, Default, Deserialize)]
pub struct ClientSettings {
    /// URL of the GnuDIP service
    pub url: String,

    /// User name at the service
    pub user: String,

    /// Plaintext password
    pub password: String,

    /// Domain name to update
    pub domain_name: String,

    /// Explicit address; selects REGISTER mode
    #[serde(default)]
    pub address: Option<String>,

    /// Take the domain offline
    #[serde(default)]
    pub offline: bool,

    /// Delay between updates; zero means a single update
    ///
    /// Deserializes from a number of seconds or a string such as `"5m"`.
    #[serde(default, deserialize_with = "deserialize_interval")]
    pub interval: Duration,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"<REDACTED>")
            .field("domain_name", &self.domain_name)
            .field("address", &self.address)
            .field("offline", &self.offline)
            .field("interval", &self.interval)
            .finish()
    }
}

impl ClientSettings {
    /// Validate the settings
    ///
    /// Runs before any network activity.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::config("url is required"));
        }
        if self.user.is_empty() {
            return Err(Error::config("user is required"));
        }
        if self.password.is_empty() {
            return Err(Error::config("password is required"));
        }
        if self.domain_name.is_empty() {
            return Err(Error::config("domain-name is required"));
        }
        if self.has_address() && self.offline {
            return Err(Error::config("Cannot set address with offline"));
        }
        Ok(())
    }

    /// Request mode implied by `address` and `offline`
    pub fn request_mode(&self) -> RequestMode {
        if self.offline {
            RequestMode::Offline
        } else if self.has_address() {
            RequestMode::Register
        } else {
            RequestMode::RegisterPassive
        }
    }

    /// Whether updates repeat (non-zero interval)
    pub fn is_daemon(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Validate and build the immutable client configuration
    pub fn to_client_config(&self) -> Result<ClientConfig> {
        self.validate()?;
        ClientConfig::new(
            self.url.clone(),
            self.user.clone(),
            &self.password,
            self.domain_name.clone(),
            self.request_mode(),
            self.address.clone(),
        )
    }

    fn has_address(&self) -> bool {
        self.address.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// Parse an update interval
///
/// Accepts a bare number of seconds (`"300"`) or a sequence of
/// number/unit pairs with units `h`, `m`, `s`, `ms` (`"1h30m"`, `"1.5s"`).
pub fn parse_interval(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.is_empty() {
        return Err(Error::config("interval cannot be empty"));
    }

    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let invalid = || Error::config(format!("invalid interval: {:?}", input));

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(invalid());
        }
        let (number, tail) = rest.split_at(num_len);
        let value: f64 = number.parse().map_err(|_| invalid())?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let secs = match unit {
            "h" => value * 3600.0,
            "m" => value * 60.0,
            "s" => value,
            "ms" => value / 1000.0,
            "" => {
                return Err(Error::config(format!(
                    "missing unit in interval: {:?}",
                    input
                )));
            }
            other => {
                return Err(Error::config(format!(
                    "unknown unit {:?} in interval: {:?}",
                    other, input
                )));
            }
        };

        let step = Duration::try_from_secs_f64(secs).map_err(|_| invalid())?;
        total = total.checked_add(step).ok_or_else(invalid)?;
        rest = tail;
    }

    Ok(total)
}

fn deserialize_interval<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_interval(&text).map_err(serde::de::Error::custom),
    }
}
