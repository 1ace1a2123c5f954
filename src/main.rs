//! Exchange manager daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌───────────────────────────────────────────────┐
//!                  │               EXCHANGE MANAGER                 │
//!                  │                                                │
//!   Operator ──────┼─▶ api ──▶ manager ──▶ broker gateway ──────────┼──▶ Broker
//!   (HTTP/CLI)     │              │                                 │    (mgmt API)
//!                  │              ▼                                 │
//!                  │   ┌──────────────────┐  ┌──────────────────┐   │
//!                  │   │ exchange registry │  │ process registry │◀──┼─── Consumer
//!                  │   └──────────────────┘  └──────────────────┘   │    workers
//!                  │              │                  ▲              │    (heartbeats)
//!                  │              ▼                  │              │
//!                  │        orchestrator ────────────┘              │
//!                  │        (reload / drain / status)               │
//!                  │                                                │
//!                  │   config · observability · lifecycle           │
//!                  └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use exchange_manager::api::{self, ApiState};
use exchange_manager::broker::HttpBrokerGateway;
use exchange_manager::config::{load_config, ManagerConfig};
use exchange_manager::lifecycle::{signals, Shutdown};
use exchange_manager::observability::{logging, metrics};
use exchange_manager::{ExchangeManager, ExchangeRegistry, ProcessRegistry};

#[derive(Parser)]
#[command(name = "exchange-manager")]
#[command(about = "Management layer for message-broker exchanges", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "manager.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        ManagerConfig::default()
    };

    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.api.bind_address,
        broker = %config.broker.api_url,
        seeded_exchanges = config.exchanges.len(),
        "exchange-manager starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "failed to parse metrics address"
            ),
        }
    }

    let gateway = Arc::new(HttpBrokerGateway::new(&config.broker)?);
    let manager = Arc::new(ExchangeManager::new(
        Arc::new(ExchangeRegistry::new()),
        Arc::new(ProcessRegistry::new()),
        gateway,
        config.reload.settings(),
    ));

    // Seed exchanges from config, broker first. Fail fast: a broker that
    // rejects the seed set at boot is a startup condition, not an
    // operational error.
    manager.bootstrap(&config.exchanges).await?;

    let shutdown = Shutdown::new();
    let mut shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        signals::watch_signals(&shutdown).await;
    });

    let state = ApiState {
        manager,
        api_key: config.api.api_key.clone(),
    };
    let app = api::router(
        state,
        std::time::Duration::from_secs(config.api.request_timeout_secs),
    );

    let listener = TcpListener::bind(&config.api.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "management API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}
