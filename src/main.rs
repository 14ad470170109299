//! OTP relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                    OTP RELAY                     │
//!                      │                                                  │
//!   Client Request     │  ┌──────────┐   ┌─────────────┐   ┌───────────┐  │
//!   ───────────────────┼─▶│  http    │──▶│ otp         │──▶│ contract  │  │
//!                      │  │ handlers │   │ coordinator │   │ encode /  │  │
//!                      │  └────┬─────┘   └──────┬──────┘   │ decode    │  │
//!                      │       │                │          └───────────┘  │
//!                      │       ▼                ▼                         │
//!                      │  ┌──────────┐   ┌─────────────┐                  │      Ledger
//!                      │  │ summary  │──▶│ ledger      │──────────────────┼───▶  node
//!                      │  │ builder  │   │ transactor  │   JSON-RPC       │   (or memory)
//!                      │  └──────────┘   └─────────────┘                  │
//!                      │                                                  │
//!                      │  config · observability · session · lifecycle   │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use otp_relay::config::load_or_default;
use otp_relay::lifecycle::{app_state, build_services, signals, Shutdown};
use otp_relay::observability::{init_tracing, metrics};
use otp_relay::HttpServer;

#[derive(Parser)]
#[command(name = "otp-relay")]
#[command(about = "HTTP relay for an OTP smart contract", long_about = None)]
struct Args {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    init_tracing(&config.observability.log_level);
    tracing::info!("otp-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        ledger_mode = ?config.ledger.mode,
        rpc_url = %config.ledger.rpc_url,
        artifact = %config.contract.artifact_path,
        enforce_session_order = config.session.enforce_order,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let services = build_services(&config).await?;
    match services.ledger.block_number().await {
        Ok(number) => tracing::info!(block_number = number, "Ledger reachable"),
        Err(e) => tracing::warn!(error = %e, "Ledger not reachable yet"),
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let state = app_state(&config, &services);
    let server = HttpServer::new(config, state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
