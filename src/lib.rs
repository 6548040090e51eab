//! Watchlist Tracker - Stock Watchlist Annotation
//!
//! A watchlist of ticker symbols annotated with per-timeframe calls, trend
//! checkboxes and notes, persisted to a local cache and to a SQLite-backed
//! REST server that also stores trading-journal blog posts.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;
pub mod state;
pub mod watchlist;

use api::ApiServer;
use config::ServerConfig;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watchlist_tracker=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Run the watchlist server until Ctrl-C
pub async fn run() -> error::Result<()> {
    init_tracing();

    tracing::info!("Starting Watchlist Tracker...");

    let config = ServerConfig::from_env()?;
    let state = Arc::new(AppState::new(config)?);
    tracing::info!("Application state initialized");

    let mut server = ApiServer::new(state);
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    server.stop();
    server.join().await;
    Ok(())
}
