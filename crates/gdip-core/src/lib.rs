// # gdip-core
//
// Core library for a GnuDIP dynamic DNS client.
//
// ## Architecture Overview
//
// - **digest**: Hex MD5 used for the password hash and the challenge response
// - **parser**: Lenient extraction of `<meta name content>` pairs from responses
// - **Session**: The two-exchange challenge/response protocol for one cycle
// - **Updater**: Single-shot and repeating update cycles
// - **Transport**: Trait for the HTTP GETs (implemented in `gdip-transport-http`)
// - **LogSink**: Trait for log output, injected instead of a global logger
//
// ## Update Cycle
//
// 1. GET the endpoint, read `salt`, `time`, `sign`
// 2. Compute `pass = md5_hex(md5_hex(password) + "." + salt)`
// 3. GET the endpoint with the update query, read `retc` and `addr`
// 4. Map `retc` to an outcome
//
// Nothing is cached between cycles; every cycle fetches a fresh salt.

pub mod traits;
pub mod digest;
pub mod parser;
pub mod session;
pub mod updater;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{Transport, LogSink, LogLevel, TracingSink, NoopSink};
pub use session::{Session, ChallengedSession, ChallengeMaterial, ReturnCode, UpdateOutcome};
pub use updater::Updater;
pub use config::{ClientConfig, ClientSettings, RequestMode};
pub use error::{Error, Result};
