//! ENS asset gateway.
//!
//! Resolves human-readable names (ENS `.eth`, Base `.base.eth` / `.base`) and raw
//! addresses to accounts, and submits ETH or ERC-20 transfers to them.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────┐
//!                   │                      GATEWAY                         │
//!   Client Request  │  ┌─────────┐   ┌──────────┐   ┌───────────────────┐  │
//!   ────────────────┼─▶│  http   │──▶│ handlers │──▶│ naming::dispatcher│  │
//!                   │  │ server  │   └────┬─────┘   │  + classifier     │  │
//!                   │  └─────────┘        │         └────────┬──────────┘  │
//!                   │                     ▼                  ▼             │
//!                   │             ┌──────────────┐   ┌──────────────┐      │     JSON-RPC
//!                   │             │  transfer::  │──▶│  blockchain  │──────┼──▶  providers
//!                   │             │ orchestrator │   │ client/wallet│      │
//!                   │             └──────────────┘   └──────────────┘      │
//!                   │                                                      │
//!                   │   config · lifecycle · observability (cross-cutting) │
//!                   └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::net::TcpListener;

use ens_asset_gateway::config::{load_from_env, GatewayConfig};
use ens_asset_gateway::http::{AppState, HttpServer};
use ens_asset_gateway::lifecycle::{build_services, signals, Shutdown};
use ens_asset_gateway::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "ens-asset-gateway", version, about = "Name resolution and asset transfer gateway")]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_from_env(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        println!("Configuration OK");
        return ExitCode::SUCCESS;
    }

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ens-asset-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        networks = ?config.networks.keys().collect::<Vec<_>>(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated at load time.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let services = build_services(&config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(&config, AppState::from(services));
    server.run(listener, shutdown.subscribe()).await?;

    Ok(())
}
