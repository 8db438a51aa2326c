//! Test doubles and common utilities for protocol contract tests
//!
//! The doubles share their state through `Arc`s so a test can hand a clone
//! to the `Updater` and still inspect what happened afterwards.

#![allow(dead_code)]

use gdip_core::config::{ClientConfig, RequestMode};
use gdip_core::error::{Error, Result};
use gdip_core::traits::{LogLevel, LogSink, Transport};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const ENDPOINT: &str = "http://gnudip.example.net/gnudip/cgi-bin/gdipupdt.cgi";
pub const USER: &str = "alice";
pub const PASSWORD: &str = "correct horse";
pub const DOMAIN: &str = "alice.dyn.example.net";

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Fail(String),
}

/// A transport that replays scripted replies and records every URL
///
/// When the script runs out, requests fail with a transport error.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn push_body(&self, body: impl Into<Vec<u8>>) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::Body(body.into()));
        self
    }

    /// Queue a transport failure
    pub fn push_failure(&self, message: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.to_string()));
        self
    }

    /// Queue both replies of one full update cycle
    pub fn push_cycle(&self, salt: &str, retc: &str, addr: &str) -> &Self {
        self.push_body(challenge_body(salt, "1700000000", "sig-".to_string() + salt));
        self.push_body(update_body(retc, addr));
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());

        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail(message)) => Err(Error::transport(message)),
            None => Err(Error::transport("script exhausted")),
        }
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}

/// A transport whose requests never complete
#[derive(Clone, Default)]
pub struct HangingTransport {
    requests: Arc<Mutex<Vec<String>>>,
}

impl HangingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Transport for HangingTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        std::future::pending().await
    }

    fn transport_name(&self) -> &'static str {
        "hanging"
    }
}

/// A log sink that keeps every message
#[derive(Clone, Default)]
pub struct RecordingSink {
    entries: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|(_, m)| m.contains(needle))
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

/// Body of a challenge response
pub fn challenge_body(salt: &str, time: &str, sign: impl AsRef<str>) -> String {
    format!(
        r#"<html>
<head>
<title>GnuDIP Update Server</title>
<meta name="salt" content="{}">
<meta name="time" content="{}">
<meta name="sign" content="{}">
</head>
<body>
<center><h2>GnuDIP Update Server</h2></center>
</body>
</html>
"#,
        salt,
        time,
        sign.as_ref()
    )
}

/// Body of an update response
pub fn update_body(retc: &str, addr: &str) -> String {
    format!(
        r#"<html>
<head>
<title>GnuDIP Update Server</title>
<meta name="retc" content="{}">
<meta name="addr" content="{}">
</head>
<body>
<center><h2>GnuDIP Update Server</h2></center>
</body>
</html>
"#,
        retc, addr
    )
}

/// Config for the given mode against [`ENDPOINT`]
pub fn client_config(mode: RequestMode, address: Option<&str>) -> ClientConfig {
    ClientConfig::new(
        ENDPOINT,
        USER,
        PASSWORD,
        DOMAIN,
        mode,
        address.map(str::to_string),
    )
    .expect("test config is valid")
}

/// Split the query of a recorded URL into ordered key/value pairs
pub fn query_pairs(url: &str) -> Vec<(String, String)> {
    let Some((_, query)) = url.split_once('?') else {
        return Vec::new();
    };

    query
        .split('&')
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k.to_string(), v.to_string())
        })
        .collect()
}

/// Value of `key` in the query of a recorded URL
pub fn query_value(url: &str, key: &str) -> Option<String> {
    query_pairs(url)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}
