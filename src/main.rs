//! Passport Score Proxy
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌───────────────────────────────────────────────┐
//!                          │                 SCORE PROXY                   │
//!     Client Request       │  ┌─────────┐   ┌─────────┐   ┌────────────┐   │
//!     ─────────────────────┼─▶│  http   │──▶│ routing │──▶│  address   │   │
//!                          │  │ server  │   │         │   │ validation │   │
//!                          │  └─────────┘   └─────────┘   └─────┬──────┘   │
//!                          │                                    ▼          │
//!     Client Response      │  ┌──────────┐           ┌────────────────┐    │
//!     ◀────────────────────┼──│ response │◀──────────│ upstream client│◀───┼──── Scoring
//!                          │  │ shaping  │           │ (+ API key)    │    │     provider
//!                          │  └──────────┘           └────────────────┘    │
//!                          │                                               │
//!                          │  config · observability · lifecycle           │
//!                          └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use passport_proxy::config::{load_config, ProxyConfig};
use passport_proxy::lifecycle::{wait_for_shutdown, Shutdown};
use passport_proxy::observability::{logging, metrics};
use passport_proxy::upstream::ApiKey;
use passport_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "passport-proxy")]
#[command(about = "Proxy for Gitcoin Passport score lookups", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("passport-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        scorer_id = %config.upstream.scorer_id,
        strict_methods = config.score.strict_methods,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let api_key = ApiKey::from_env(&config.upstream.api_key_env);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config, api_key)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
