// # Log Sink Trait
//
// The core never touches a global logger. Sessions and the updater are given
// a sink at construction time and report through it. A daemon passes
// `TracingSink`; library users that want silence pass `NoopSink`.

use std::fmt;

/// Severity of a core log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Error,
    Info,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

/// Destination for core log messages
///
/// Implementations must not fail; the core behaves the same whichever sink
/// it is given.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
}

/// Forwards to `tracing`, under the `gdip` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!(target: "gdip", "{}", message),
            LogLevel::Info => tracing::info!(target: "gdip", "{}", message),
            LogLevel::Debug => tracing::debug!(target: "gdip", "{}", message),
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _level: LogLevel, _message: &str) {}
}
