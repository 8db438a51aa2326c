//! GnuDIP protocol session
//!
//! One session performs one update cycle: two strictly sequential GET
//! exchanges against the same endpoint.
//!
//! ## State Machine
//!
//! ```text
//!   Session ──fetch_challenge()──▶ ChallengedSession ──submit_response()──▶ UpdateOutcome
//!   (Init)                          (Challenged)                            (Done)
//! ```
//!
//! Both transitions consume `self`. A finished (or failed) session cannot be
//! driven again; the next cycle starts from a fresh [`Session`] and fetches
//! a fresh salt.
//!
//! ## Wire Format
//!
//! ```text
//! GET <endpoint>
//!   ◀── <meta name="salt">, <meta name="time">, <meta name="sign">
//! GET <endpoint>?salt=..&time=..&sign=..&user=..&pass=..&domn=..&reqc=..[&addr=..]
//!   ◀── <meta name="retc">, <meta name="addr">
//! ```

mod outcome;

pub use outcome::{ChallengeMaterial, ReturnCode, UpdateOutcome};

use crate::config::{ClientConfig, RequestMode};
use crate::digest;
use crate::error::Result;
use crate::parser::{self, MetaTags};
use crate::traits::{LogSink, Transport};

/// A session in its initial state
pub struct Session<'a> {
    config: &'a ClientConfig,
    transport: &'a dyn Transport,
    log: &'a dyn LogSink,
}

impl<'a> Session<'a> {
    /// Start a new session for one update cycle
    pub fn new(config: &'a ClientConfig, transport: &'a dyn Transport, log: &'a dyn LogSink) -> Self {
        Self {
            config,
            transport,
            log,
        }
    }

    /// First exchange: request a challenge
    ///
    /// Missing `salt`, `time` or `sign` tags are relayed as empty strings,
    /// matching what existing servers and clients expect.
    ///
    /// # Errors
    ///
    /// Transport and parse errors end the cycle here; no second request is
    /// issued.
    pub async fn fetch_challenge(self) -> Result<ChallengedSession<'a>> {
        let tags = self.get("").await?;

        for key in ["salt", "time", "sign"] {
            if tags.get(key).is_none() {
                self.log.debug(&format!(
                    "challenge response has no {:?} tag, sending it empty",
                    key
                ));
            }
        }

        let material = ChallengeMaterial {
            salt: tags.get_or_empty("salt").to_string(),
            time: tags.get_or_empty("time").to_string(),
            sign: tags.get_or_empty("sign").to_string(),
        };

        Ok(ChallengedSession {
            session: self,
            material,
        })
    }

    /// GET the endpoint (with `query` appended, if non-empty) and parse the reply
    async fn get(&self, query: &str) -> Result<MetaTags> {
        let url = if query.is_empty() {
            self.config.endpoint().to_string()
        } else {
            format!("{}?{}", self.config.endpoint(), query)
        };

        self.log.debug(&format!(
            "GET {} via {}",
            redact_pass(&url),
            self.transport.transport_name()
        ));

        let body = match self.transport.get(&url).await {
            Ok(body) => body,
            Err(e) => {
                self.log.error(&format!("GET {} failed: {}", redact_pass(&url), e));
                return Err(e);
            }
        };

        let tags = match parser::parse(&body) {
            Ok(tags) => tags,
            Err(e) => {
                self.log.error(&format!(
                    "Failed to parse response of {}: {}",
                    redact_pass(&url),
                    e
                ));
                return Err(e);
            }
        };

        self.log.debug(&format!("response tags: {:?}", tags));
        Ok(tags)
    }
}

/// A session holding a fresh challenge
pub struct ChallengedSession<'a> {
    session: Session<'a>,
    material: ChallengeMaterial,
}

impl ChallengedSession<'_> {
    /// Challenge received in the first exchange
    pub fn material(&self) -> &ChallengeMaterial {
        &self.material
    }

    /// Second exchange: answer the challenge and request the update
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)`: the server answered; rejections are reported
    ///   through [`UpdateOutcome::code`], not as errors
    /// - `Err(Error)`: transport or parse failure
    pub async fn submit_response(self) -> Result<UpdateOutcome> {
        let Self { session, material } = self;
        let config = session.config;

        let query = build_query(config, &material);
        let tags = session.get(&query).await?;

        let outcome = interpret(config, tags.get_or_empty("retc"), tags.get_or_empty("addr"));

        match &outcome.code {
            ReturnCode::Success => match outcome.address() {
                Some(address) => session.log.info(&format!(
                    "Successfully updated {} as {}",
                    config.domain_name(),
                    address
                )),
                None => session.log.info(&format!("Successfully updated {}", config.domain_name())),
            },
            ReturnCode::WentOffline => session.log.info(&format!(
                "Successfully went offline {}",
                config.domain_name()
            )),
            ReturnCode::InvalidLogin => session.log.error(&format!(
                "Update of {} rejected: invalid login (or other problem)",
                config.domain_name()
            )),
            ReturnCode::Unknown(raw) => session.log.error(&format!(
                "Update of {} failed: unknown return code {:?}",
                config.domain_name(),
                raw
            )),
        }

        Ok(outcome)
    }
}

/// Build the query string of the update request
///
/// Keys always appear in the order `salt, time, sign, user, pass, domn,
/// reqc`, followed by `addr` in REGISTER mode only. Values are joined
/// literally, without URL encoding, as deployed servers expect.
pub fn build_query(config: &ClientConfig, material: &ChallengeMaterial) -> String {
    let pass = digest::challenge_response(config.password_hash(), &material.salt);

    let mut params = vec![
        ("salt", material.salt.as_str()),
        ("time", material.time.as_str()),
        ("sign", material.sign.as_str()),
        ("user", config.user()),
        ("pass", pass.as_str()),
        ("domn", config.domain_name()),
    ];

    let reqc = config.mode().code().to_string();
    params.push(("reqc", reqc.as_str()));

    if config.mode() == RequestMode::Register {
        params.push(("addr", config.address().unwrap_or("")));
    }

    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

/// Map the second response's `retc` and `addr` onto an outcome
///
/// On success the server's address wins; if it sent none, REGISTER mode
/// falls back to the configured address and the other modes report none.
pub fn interpret(config: &ClientConfig, retc: &str, addr: &str) -> UpdateOutcome {
    let code = ReturnCode::from_wire(retc);

    let address = match code {
        ReturnCode::Success if !addr.is_empty() => addr.to_string(),
        ReturnCode::Success if config.mode() == RequestMode::Register => {
            config.address().unwrap_or("").to_string()
        }
        _ => String::new(),
    };

    UpdateOutcome { code, address }
}

/// Hide the `pass` parameter of a request URL for logging
///
/// Relayed values are not escaped, so a salt or user name may itself contain
/// `&pass=`. Every such parameter is masked; over-masking is harmless.
fn redact_pass(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| if pair.starts_with("pass=") { "pass=XXX" } else { pair })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", base, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: RequestMode, address: Option<&str>) -> ClientConfig {
        ClientConfig::new(
            "http://gnudip.example.net/gnudip/cgi-bin/gdipupdt.cgi",
            "alice",
            "secret",
            "alice.dyn.example.net",
            mode,
            address.map(str::to_string),
        )
        .unwrap()
    }

    fn material() -> ChallengeMaterial {
        ChallengeMaterial {
            salt: "abc".to_string(),
            time: "123".to_string(),
            sign: "xyz".to_string(),
        }
    }

    #[test]
    fn test_query_for_register() {
        let config = config(RequestMode::Register, Some("198.51.100.7"));
        let pass = digest::digest_hex(
            format!("{}.abc", digest::digest_hex(b"secret")).as_bytes(),
        );

        assert_eq!(
            build_query(&config, &material()),
            format!(
                "salt=abc&time=123&sign=xyz&user=alice&pass={}&domn=alice.dyn.example.net&reqc=0&addr=198.51.100.7",
                pass
            )
        );
    }

    #[test]
    fn test_query_without_addr_for_other_modes() {
        for mode in [RequestMode::Offline, RequestMode::RegisterPassive] {
            let config = config(mode, Some("198.51.100.7"));
            let query = build_query(&config, &material());

            assert!(!query.contains("addr="), "{} query must not carry addr: {}", mode, query);
            assert!(query.ends_with(&format!("&reqc={}", mode.code())));
        }
    }

    #[test]
    fn test_query_key_order() {
        let config = config(RequestMode::Register, Some("192.0.2.1"));
        let query = build_query(&config, &material());
        let keys: Vec<&str> = query
            .split('&')
            .map(|pair| pair.split('=').next().unwrap())
            .collect();

        assert_eq!(keys, vec!["salt", "time", "sign", "user", "pass", "domn", "reqc", "addr"]);
    }

    #[test]
    fn test_query_values_not_escaped() {
        let config = config(RequestMode::RegisterPassive, None);
        let material = ChallengeMaterial {
            salt: "a b".to_string(),
            time: "1+2".to_string(),
            sign: "x/y=".to_string(),
        };
        let query = build_query(&config, &material);
        assert!(query.starts_with("salt=a b&time=1+2&sign=x/y=&"));
    }

    #[test]
    fn test_interpret_success_prefers_server_address() {
        let config = config(RequestMode::RegisterPassive, None);
        let outcome = interpret(&config, "0", "203.0.113.5");
        assert_eq!(outcome.code, ReturnCode::Success);
        assert_eq!(outcome.address, "203.0.113.5");

        let config = config_register();
        let outcome = interpret(&config, "0", "203.0.113.5");
        assert_eq!(outcome.address, "203.0.113.5");
    }

    fn config_register() -> ClientConfig {
        config(RequestMode::Register, Some("198.51.100.7"))
    }

    #[test]
    fn test_interpret_register_fallback() {
        let outcome = interpret(&config_register(), "0", "");
        assert_eq!(outcome.code, ReturnCode::Success);
        assert_eq!(outcome.address, "198.51.100.7");

        // Only REGISTER falls back
        let passive = config(RequestMode::RegisterPassive, Some("198.51.100.7"));
        let outcome = interpret(&passive, "0", "");
        assert_eq!(outcome.code, ReturnCode::Success);
        assert_eq!(outcome.address, "");
    }

    #[test]
    fn test_interpret_failures_and_offline() {
        let config = config_register();

        let outcome = interpret(&config, "1", "203.0.113.5");
        assert_eq!(outcome.code, ReturnCode::InvalidLogin);
        assert_eq!(outcome.address, "");
        assert!(!outcome.is_success());

        let outcome = interpret(&config, "2", "");
        assert_eq!(outcome.code, ReturnCode::WentOffline);
        assert_eq!(outcome.address(), None);
        assert!(outcome.is_success());

        let outcome = interpret(&config, "9", "203.0.113.5");
        assert_eq!(outcome.code, ReturnCode::Unknown("9".to_string()));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_redact_pass() {
        assert_eq!(
            redact_pass("http://h/u?salt=s&pass=0123abcd&domn=d"),
            "http://h/u?salt=s&pass=XXX&domn=d"
        );
        assert_eq!(redact_pass("http://h/u?pass=0123"), "http://h/u?pass=XXX");
        assert_eq!(redact_pass("http://h/u"), "http://h/u");
    }

    #[test]
    fn test_redact_pass_ignores_lookalikes_in_other_values() {
        // "bypass=" inside a salt must not leave the real value exposed
        assert_eq!(
            redact_pass("http://h/u?salt=bypass=1&user=a&pass=0123abcd&domn=d"),
            "http://h/u?salt=bypass=1&user=a&pass=XXX&domn=d"
        );

        let config = config(RequestMode::RegisterPassive, None);
        let material = ChallengeMaterial {
            salt: "x&pass=y".to_string(),
            time: "123".to_string(),
            sign: "xyz".to_string(),
        };
        let pass = digest::challenge_response(config.password_hash(), &material.salt);
        let url = format!("{}?{}", config.endpoint(), build_query(&config, &material));

        let redacted = redact_pass(&url);
        assert!(!redacted.contains(&pass));
        assert!(redacted.contains("&user=alice&pass=XXX&domn="));
    }
}
