//! upstream-guard
//!
//! An HTTP service that shields callers from an unreliable upstream
//! dependency, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                UPSTREAM GUARD                 │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐     ┌───────────────────────┐   │
//!   ─────────────────┼─▶│  http   │────▶│ strategy per route:    │   │
//!                    │  │ server  │     │  /retry     FixedRetry │   │
//!                    │  └─────────┘     │  /backoff   ExpBackoff │   │
//!                    │                  │  /circuit   Breaker    │   │     ┌──────────┐
//!                    │                  │  /ratelimit TokenBucket│───┼────▶│ unstable │
//!                    │                  │  /smart     Fallback   │   │     │ upstream │
//!                    │                  │  /unsafe    (none)     │   │     └──────────┘
//!                    │                  └───────────────────────┘   │
//!                    │                                               │
//!                    │  config · observability · lifecycle           │
//!                    └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use upstream_guard::config::{load_config, GuardConfig};
use upstream_guard::lifecycle::Shutdown;
use upstream_guard::observability::{logging, metrics};
use upstream_guard::HttpServer;

#[derive(Parser)]
#[command(name = "upstream-guard")]
#[command(about = "Resilience guard in front of an unreliable upstream", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    logging::init_tracing(&config.observability);

    tracing::info!("upstream-guard v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(&config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
