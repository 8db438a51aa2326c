//! Collaborator traits for the GnuDIP client
//!
//! - [`Transport`]: Issue the GET requests of the protocol exchange
//! - [`LogSink`]: Receive log messages from the core

pub mod transport;
pub mod log_sink;

pub use transport::Transport;
pub use log_sink::{LogSink, LogLevel, TracingSink, NoopSink};
