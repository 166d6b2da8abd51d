//! codex-link service.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │                          CODEX LINK                           │
//!   │                                                               │
//!   │  ┌────────┐  tick   ┌──────────────┐  GET /health  ┌───────┐ │
//!   │  │ poller │────────▶│  controller  │──────────────▶│backend│ │
//!   │  └────────┘         │ (per domain) │               └───────┘ │
//!   │                     └──────┬───────┘                    ▲     │
//!   │          mode flips        │ mode                       │     │
//!   │       ◀────────────────────┤                            │     │
//!   │                            ▼                            │     │
//!   │  ┌────────────┐     ┌──────────────┐   real mode        │     │
//!   │  │ status API │────▶│    feeds     │────────────────────┘     │
//!   │  └────────────┘     │              │   mock mode              │
//!   │                     │              │──▶ mock dataset          │
//!   │                     └──────────────┘                          │
//!   │                                                               │
//!   │  config (+ watcher) · logging · metrics · shutdown            │
//!   └───────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use codex_link::admin::{self, AppState};
use codex_link::config::loader::load_config;
use codex_link::config::watcher::ConfigWatcher;
use codex_link::lifecycle::{signals, startup, Shutdown};
use codex_link::observability::{logging, metrics};
use codex_link::LinkConfig;

#[derive(Parser)]
#[command(name = "codex-link")]
#[command(about = "Real/mock connectivity controller for the Codex client", long_about = None)]
struct Args {
    /// TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => LinkConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "codex-link starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_handler(shutdown.clone());

    let services = startup::build_services(config).await?;
    let mut tasks = services.spawn_pollers(&shutdown);

    // Keep the watcher alive for the life of the process.
    let _watcher = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            tasks.push(services.spawn_policy_reloader(updates, &shutdown));
            match watcher.run() {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload unavailable");
                    None
                }
            }
        }
        None => None,
    };

    if services.config.admin.enabled {
        let listener = TcpListener::bind(&services.config.admin.bind_address).await?;
        let router = admin::setup_admin_router(
            AppState::from_services(&services),
            &services.config.admin,
        );
        admin::serve(listener, router, shutdown.subscribe()).await?;
    } else {
        let mut stop = shutdown.subscribe();
        let _ = stop.recv().await;
    }

    for task in tasks {
        let _ = task.await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
