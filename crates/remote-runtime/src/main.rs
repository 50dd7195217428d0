//! # Media Remote Daemon
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then `MR_*` environment)
//! 2. Validate the shared secret is set
//! 3. Install logging
//! 4. Bind the UDP socket and start the transport loop
//! 5. Stop on Ctrl+C after the in-flight datagram

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use remote_control::RemoteConfig;
use remote_runtime::{init_logging, RemoteRuntime};

/// Authenticated UDP remote control for a media player.
#[derive(Debug, Parser)]
#[command(name = "remote-runtime", version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long, env = "MR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config =
        RemoteConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialize logging")?;
    info!(config = ?config, "configuration loaded");

    let runtime = RemoteRuntime::bind(&config).context("failed to start remote control")?;
    let shutdown = runtime.shutdown_signal();
    let mut worker = tokio::task::spawn_blocking(move || runtime.run_blocking());

    info!("Running. Press Ctrl+C to stop.");
    let stats = tokio::select! {
        joined = &mut worker => joined.context("transport loop failed")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("shutdown requested");
            shutdown.trigger();
            worker.await.context("transport loop failed")?
        }
    };

    info!(
        received = stats.received,
        responded = stats.responded,
        dropped = stats.dropped,
        "shutdown complete"
    );
    Ok(())
}
