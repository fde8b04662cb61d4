//! Availability API Server
//!
//! Run with: cargo run --bin availability-api
//!
//! # Configuration
//!
//! Read from the first config file found (see `Config::load_default`), then
//! overridden by environment variables:
//! - `AVAILABILITY_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `AVAILABILITY_API_PORT`: Port to listen on (default: 8083)
//! - `AVAILABILITY_DEFAULT_RESOLUTION`: Storage resolution for new entities (default: 5min)
//! - `AVAILABILITY_AUTO_CREATE`: Create entities on first write (default: true)
//! - `AVAILABILITY_PERSIST`: Restore and save a snapshot (default: false)
//! - `AVAILABILITY_SNAPSHOT_PATH`: Snapshot file location
//! - `AVAILABILITY_CONFIG`: Explicit config file path
//! - `RUST_LOG`: Log filter (default: from `[logging] level`)

use availability::api::{serve, AppState};
use availability::config::{Config, LoggingConfig};
use availability::store::{AvailabilityCollection, MemoryCollection};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::var("AVAILABILITY_CONFIG") {
        Ok(path) => Config::load_with_env(std::path::Path::new(&path))?,
        Err(_) => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting availability API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Default resolution: {}, auto-create: {}",
        config.store.resolution(),
        config.store.auto_create
    );

    let snapshot_path = config.store.persist.then(|| config.store.snapshot_path());

    let store = match &snapshot_path {
        Some(path) => {
            tracing::info!("Restoring snapshot from {:?}", path);
            Arc::new(MemoryCollection::load_snapshot(path)?)
        }
        None => Arc::new(MemoryCollection::new()),
    };

    let state = AppState::new(store.clone(), config.api.clone(), config.store.clone());

    tracing::info!("Starting server on {}", config.api.addr());
    serve(state, &config.api).await?;

    if let Some(path) = &snapshot_path {
        tracing::info!("Writing snapshot to {:?}", path);
        store.save_snapshot(path).await?;
    }

    tracing::info!("Final collection: {}", store.stats().await);
    tracing::info!("Availability API server stopped");

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("availability={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
