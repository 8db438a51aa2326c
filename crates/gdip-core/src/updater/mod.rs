//! Update orchestrator
//!
//! The Updater is responsible for:
//! - Running one complete protocol cycle on a fresh session
//! - Repeating cycles at a fixed interval until shutdown
//! - Reporting every cycle result to the caller
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!   interval ───▶ │   Updater    │ ───▶ on_result(&Result<UpdateOutcome>)
//!   shutdown ───▶ └──────────────┘
//!                        │ one fresh Session per cycle
//!                        ▼
//!                 ┌──────────────┐      ┌─────────────┐
//!                 │   Session    │ ───▶ │  Transport  │
//!                 └──────────────┘      └─────────────┘
//! ```
//!
//! ## Retry Policy
//!
//! There is none. A failed cycle is reported and the next one runs after the
//! regular interval. Callers that want retries drive [`Updater::run_once`]
//! themselves.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::{Session, UpdateOutcome};
use crate::traits::{LogSink, Transport};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Drives GnuDIP update cycles for one domain
///
/// ## Lifecycle
///
/// 1. Create with [`Updater::new()`]
/// 2. Call [`Updater::run_once()`] for a single update, or
///    [`Updater::run_repeating()`] to keep the domain updated
/// 3. Repeating runs end on Ctrl-C (or the supplied shutdown signal)
///
/// ## Concurrency
///
/// Cycles never overlap: a cycle finishes (or is cancelled) before the
/// interval wait starts. The configuration is read-only, so no locking is
/// needed.
pub struct Updater {
    /// Immutable client configuration
    config: ClientConfig,

    /// Transport for the protocol exchanges
    transport: Box<dyn Transport>,

    /// Destination for log messages
    log: Box<dyn LogSink>,
}

impl Updater {
    /// Create a new updater
    ///
    /// # Parameters
    ///
    /// - `config`: validated client configuration
    /// - `transport`: transport implementation
    /// - `log`: log sink (pass `NoopSink` to disable logging)
    pub fn new(config: ClientConfig, transport: Box<dyn Transport>, log: Box<dyn LogSink>) -> Self {
        Self {
            config,
            transport,
            log,
        }
    }

    /// The configuration every cycle runs with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a single update cycle
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)`: the server answered (check
    ///   [`UpdateOutcome::is_success`] or use
    ///   [`UpdateOutcome::ensure_success`])
    /// - `Err(Error)`: transport or parse failure
    pub async fn run_once(&self) -> Result<UpdateOutcome> {
        self.log.debug(&format!(
            "Starting update cycle for {} ({})",
            self.config.domain_name(),
            self.config.mode()
        ));

        let session = Session::new(&self.config, self.transport.as_ref(), self.log.as_ref());
        let challenged = session.fetch_challenge().await?;
        challenged.submit_response().await
    }

    /// Run update cycles every `interval` until Ctrl-C
    ///
    /// Each cycle result, success or failure, is handed to `on_result`. A
    /// failing cycle never stops the loop.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: clean shutdown
    /// - `Err(Error)`: `interval` is zero
    pub async fn run_repeating<F>(&self, interval: Duration, on_result: F) -> Result<()>
    where
        F: FnMut(&Result<UpdateOutcome>) + Send,
    {
        self.run_internal(interval, on_result, None).await
    }

    /// Same as [`Updater::run_repeating`], stopped by an explicit signal
    ///
    /// Shutdown is honored during the interval wait and also interrupts an
    /// in-flight cycle. Passing `None` falls back to Ctrl-C.
    pub async fn run_repeating_with_shutdown<F>(
        &self,
        interval: Duration,
        on_result: F,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()>
    where
        F: FnMut(&Result<UpdateOutcome>) + Send,
    {
        self.run_internal(interval, on_result, shutdown_rx).await
    }

    async fn run_internal<F>(
        &self,
        interval: Duration,
        mut on_result: F,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()>
    where
        F: FnMut(&Result<UpdateOutcome>) + Send,
    {
        if interval.is_zero() {
            return Err(Error::config("Update interval must be > 0 for repeating updates"));
        }

        // Either the caller's signal or Ctrl-C; a dropped sender also stops the loop
        let mut shutdown: Pin<Box<dyn Future<Output = ()> + Send>> = match shutdown_rx {
            Some(rx) => Box::pin(async move {
                let _ = rx.await;
            }),
            None => Box::pin(async {
                let _ = tokio::signal::ctrl_c().await;
            }),
        };

        self.log.info(&format!(
            "Updating {} every {:?}",
            self.config.domain_name(),
            interval
        ));

        loop {
            let result = tokio::select! {
                result = self.run_once() => result,
                _ = &mut shutdown => {
                    self.log.info("Shutdown signal received during update cycle");
                    break;
                }
            };

            on_result(&result);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    self.log.info("Shutdown signal received");
                    break;
                }
            }
        }

        self.log.info("Updater stopped");
        Ok(())
    }
}
