//! Email-to-link lookup service.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!   GET /lookup      │  http (axum)                                 │
//!   POST /lookup ───▶│  request id → trace → auth → handlers        │
//!   POST /reload     │        │                     │               │
//!   GET /health      │        ▼                     ▼               │
//!                    │  ┌───────────┐  install ┌──────────────┐     │
//!   SIGHUP ─────────▶│  │  reload   │─────────▶│ LookupStore  │     │
//!   file change ────▶│  │ (loader)  │          │ ArcSwap<Snap>│     │
//!                    │  └─────┬─────┘          └──────────────┘     │
//!                    │        │ csv rows                            │
//!                    └────────┼─────────────────────────────────────┘
//!                             ▼
//!                      source file (Email, Login Link)
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use link_lookup::config::{resolve_config, ConfigOverrides};
use link_lookup::http::HttpServer;
use link_lookup::lifecycle::signals::spawn_signal_handler;
use link_lookup::lifecycle::{bootstrap, Shutdown, StartupError};
use link_lookup::observability::{logging, metrics};
use link_lookup::reload::watcher::SourceWatcher;

#[derive(Parser)]
#[command(name = "link-lookup", version, about = "Serve email-to-link lookups from a CSV file")]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match resolve_config(&cli.overrides) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&Default::default());
            tracing::error!(error = %e, "Invalid configuration");
            return Err(StartupError::from(e).into());
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("link-lookup v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        source = %config.source.path.display(),
        root = %config.source.root.display(),
        auth_enabled = config.auth.enabled(),
        watch = config.source.watch,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let reloader = match bootstrap(&config) {
        Ok(reloader) => reloader,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let address = config.listener.bind_address();
    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(source) => {
            let e = StartupError::Bind { address, source };
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone(), reloader.clone());

    let _watch_task = if config.source.watch {
        let watcher = SourceWatcher::new(
            &reloader.default_path(),
            std::time::Duration::from_millis(config.source.watch_debounce_ms),
        );
        match watcher.spawn(reloader.clone(), shutdown.subscribe()) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::error!(error = %e, "Failed to start source watcher, continuing without it");
                None
            }
        }
    } else {
        None
    };

    let server = HttpServer::new(config, reloader);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
