// # gdipwebc - GnuDIP Web Client
//
// Thin command-line wrapper around gdip-core:
// 1. Reading settings from flags or `GDIPWEBC_*` environment variables
// 2. Initializing logging and the runtime
// 3. Running one update, or repeating updates until SIGINT/SIGTERM
//
// All protocol logic lives in gdip-core; nothing here retries.
//
// ## Example
//
// ```bash
// export GDIPWEBC_URL=http://gnudip.example.net/gnudip/cgi-bin/gdipupdt.cgi
// export GDIPWEBC_USER=alice
// export GDIPWEBC_PASSWORD=secret
// export GDIPWEBC_DOMAIN_NAME=alice.dyn.example.net
//
// gdipwebc                  # single update, prints the address
// gdipwebc --interval 5m    # update every five minutes
// gdipwebc --offline        # take the domain offline
// ```

use anyhow::Result;
use clap::Parser;
use gdip_core::config::{ClientConfig, ClientSettings, parse_interval};
use gdip_core::traits::TracingSink;
use gdip_core::Updater;
use gdip_transport_http::HttpTransport;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Update succeeded or clean shutdown
/// - 1: Configuration error
/// - 2: Update failure or runtime error
#[derive(Debug, Clone, Copy)]
enum GdipExitCode {
    /// Update succeeded (one-shot) or clean shutdown (daemon)
    Success = 0,
    /// Invalid flags or settings
    ConfigError = 1,
    /// Update rejected, transport failure, or runtime failure
    UpdateFailed = 2,
}

impl From<GdipExitCode> for ExitCode {
    fn from(code: GdipExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "gdipwebc", version, about = "GnuDIP dynamic DNS client")]
struct Cli {
    /// URL of the GnuDIP update service
    #[arg(long, env = "GDIPWEBC_URL")]
    url: String,

    /// User name at the service
    #[arg(long, env = "GDIPWEBC_USER")]
    user: String,

    /// Password
    #[arg(long, env = "GDIPWEBC_PASSWORD", hide_env_values = true)]
    password: String,

    /// Domain name to update
    #[arg(long, env = "GDIPWEBC_DOMAIN_NAME")]
    domain_name: String,

    /// Register this address instead of the one the server sees
    #[arg(long, env = "GDIPWEBC_ADDRESS")]
    address: Option<String>,

    /// Take the domain offline
    #[arg(long, env = "GDIPWEBC_OFFLINE")]
    offline: bool,

    /// Update interval such as 300, 90s, 5m or 1h30m; 0 updates once
    #[arg(long, env = "GDIPWEBC_INTERVAL", default_value = "0", value_parser = parse_interval)]
    interval: Duration,

    /// Enable debug logging
    #[arg(long, env = "GDIPWEBC_DEBUG")]
    debug: bool,
}

impl Cli {
    fn settings(&self) -> ClientSettings {
        ClientSettings {
            url: self.url.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            domain_name: self.domain_name.clone(),
            address: self.address.clone(),
            offline: self.offline,
            interval: self.interval,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                GdipExitCode::ConfigError.into()
            } else {
                // --help and --version
                GdipExitCode::Success.into()
            };
        }
    };

    let settings = cli.settings();
    let config = match settings.to_client_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run 'gdipwebc --help' for usage.");
            return GdipExitCode::ConfigError.into();
        }
    };

    if let Err(e) = init_tracing(cli.debug) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return GdipExitCode::ConfigError.into();
    }

    debug!("Settings: {:?}", settings);

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return GdipExitCode::UpdateFailed.into();
        }
    };

    let interval = settings.interval;
    let result = rt.block_on(async move {
        let outcome = if interval.is_zero() {
            run_single(config).await
        } else {
            run_daemon(config, interval).await
        };

        match outcome {
            Ok(()) => GdipExitCode::Success,
            Err(e) => {
                if !reported_by_session(&e) {
                    error!("{}", e);
                }
                GdipExitCode::UpdateFailed
            }
        }
    });

    result.into()
}

/// Install the fmt subscriber on stderr
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--debug`.
fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_updater(config: ClientConfig) -> Result<Updater> {
    let transport = HttpTransport::new()?;
    Ok(Updater::new(
        config,
        Box::new(transport),
        Box::new(TracingSink),
    ))
}

/// Run a single update and print the resolved address
async fn run_single(config: ClientConfig) -> Result<()> {
    let updater = build_updater(config)?;
    let outcome = updater.run_once().await?.ensure_success()?;

    println!("{}", outcome.address().unwrap_or_default());
    Ok(())
}

/// Update every `interval` until SIGINT or SIGTERM
async fn run_daemon(config: ClientConfig, interval: Duration) -> Result<()> {
    let updater = build_updater(config)?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let shutdown = shutdown_signal()?;
    tokio::spawn(async move {
        let signal = shutdown.await;
        info!("Received shutdown signal: {}", signal);
        let _ = shutdown_tx.send(());
    });

    // Each cycle is logged by the session through `TracingSink`
    updater
        .run_repeating_with_shutdown(interval, |_| {}, Some(shutdown_rx))
        .await?;

    Ok(())
}

/// Whether the session already logged this error when the cycle ended
fn reported_by_session(err: &anyhow::Error) -> bool {
    err.downcast_ref::<gdip_core::Error>()
        .is_some_and(|e| e.is_exchange_failure() || e.is_protocol())
}

/// Wait for SIGTERM or SIGINT
///
/// Handlers are installed before returning so that setup failures surface
/// as errors instead of an immediate shutdown.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl std::future::Future<Output = &'static str> + Send> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Wait for Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl std::future::Future<Output = &'static str> + Send> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to wait for CTRL-C: {}", e);
        }
        "SIGINT"
    })
}
