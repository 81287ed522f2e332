//! Signup funnel edge service.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!   POST /api/signup   │  funnel::signup ──▶ data store ──▶ mailer    │
//!   POST /api/track  ──┼─▶funnel::track  ──▶ data store               │
//!                      │                                              │
//!   /api/admin/*     ──┼─▶security::rate_limit (gate)                 │
//!                      │      │  ▲ observe 401/200                    │
//!                      │      ▼  │                                    │
//!                      │   admin::handlers ──▶ data store / mailer    │
//!                      │      │                                       │
//!                      │      └─ security::compare (bearer secret)    │
//!                      │                                              │
//!                      │  security::attempts ──▶ store::MemoryStore   │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use signup_funnel::config::load_config;
use signup_funnel::observability::{logging, metrics};
use signup_funnel::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "funnel-server", version, about = "Signup funnel edge service")]
struct Args {
    /// Path to a TOML config file. Defaults plus environment otherwise.
    #[arg(short, long, env = "FUNNEL_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("funnel-server v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_attempts = config.admin.max_attempts,
        window_secs = config.admin.window_secs,
        request_timeout_secs = config.timeouts.request_secs,
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
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
