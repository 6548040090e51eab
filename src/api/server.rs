//! HTTP server for the REST API and the browser pages

use crate::api::handlers;
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the full router. Paths outside `/api` fall through to the static
/// directory.
pub fn router(state: Arc<AppState>) -> Router {
    // Pages may be opened from another origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir);
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        // ================================================================
        // Health check
        // ================================================================
        .route("/health", get(handlers::health_check))

        // ================================================================
        // Watchlist snapshots
        // ================================================================
        .route("/api/save-watchlist", post(handlers::save_watchlist))
        .route("/api/load-watchlist", get(handlers::load_watchlist))
        .route("/api/db-info", get(handlers::db_info))
        .route("/api/snapshots", get(handlers::list_snapshots))
        .route("/api/snapshot/:id", get(handlers::get_snapshot))
        .route("/api/clear-database", post(handlers::clear_database))

        // ================================================================
        // Blogs
        // ================================================================
        .route("/api/blogs", post(handlers::create_blog).get(handlers::list_blogs))
        .route(
            "/api/blogs/:id",
            get(handlers::get_blog)
                .put(handlers::update_blog)
                .delete(handlers::delete_blog),
        )
        .route("/api/images/:id", get(handlers::get_image))

        .fallback_service(static_files)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Watchlist API server manager
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ApiServer {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            shutdown_tx: None,
            task: None,
        }
    }

    /// Bind the configured address and serve in the background.
    ///
    /// Returns the bound address, which differs from the configured one
    /// when port 0 is requested.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let addr = self.state.config.socket_addr()?;
        let app = router(self.state.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        info!("Starting watchlist server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        self.task = Some(tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Watchlist server shutting down");
            });

            if let Err(e) = server.await {
                error!("Watchlist server error: {}", e);
            }
        }));

        info!("Watchlist server started successfully");
        info!("");
        info!("=== Endpoints ===");
        info!("  GET    http://{}/health", local_addr);
        info!("  POST   http://{}/api/save-watchlist", local_addr);
        info!("  GET    http://{}/api/load-watchlist", local_addr);
        info!("  GET    http://{}/api/db-info", local_addr);
        info!("  GET    http://{}/api/snapshots", local_addr);
        info!("  GET    http://{}/api/snapshot/{{id}}", local_addr);
        info!("  POST   http://{}/api/clear-database", local_addr);
        info!("  GET    http://{}/api/blogs", local_addr);
        info!("  POST   http://{}/api/blogs", local_addr);
        info!("  GET    http://{}/api/blogs/{{id}}", local_addr);
        info!("  PUT    http://{}/api/blogs/{{id}}", local_addr);
        info!("  DELETE http://{}/api/blogs/{{id}}", local_addr);
        info!("  GET    http://{}/api/images/{{id}}", local_addr);
        info!("Static files from {:?}", self.state.config.static_dir);
        info!("Database: {}", self.state.db_path());

        Ok(local_addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("Watchlist server stop signal sent");
        }
    }

    /// Wait for the server task to finish
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Watchlist server task failed: {}", e);
            }
        }
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::db::sqlite::SqliteDb;

    #[tokio::test]
    async fn test_start_and_stop() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        let state = Arc::new(AppState::with_database(
            SqliteDb::open_in_memory().unwrap(),
            config,
        ));

        let mut server = ApiServer::new(state);
        let addr = server.start().await.unwrap();
        assert_ne!(addr.port(), 0);

        let body: serde_json::Value = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["success"], true);

        server.stop();
        server.join().await;
    }
}
