//! HTTP server.
//!
//! - `POST /api/search` — run a search (`{ subgenre, searchType }`)
//! - `GET  /api/subgenres` — subgenre catalog
//! - `GET  /health` — server status
//! - everything else — static files from the configured directory

pub mod routes;

use std::path::Path;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::search::SearchService;

/// Shared application state
///
/// Everything here is read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(search: SearchService, catalog: Catalog) -> Self {
        Self {
            search: Arc::new(search),
            catalog: Arc::new(catalog),
        }
    }
}

/// Build the application router
///
/// Static files are served from `static_dir` when it exists; otherwise
/// unknown paths fall through to a plain 404.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/api/search", post(routes::search))
        .route("/api/subgenres", get(routes::subgenres))
        .route("/health", get(routes::health))
        .with_state(state);

    let app = match static_dir {
        Some(dir) if dir.is_dir() => {
            tracing::info!("Serving static files from {}", dir.display());
            api.fallback_service(ServeDir::new(dir))
        }
        Some(dir) => {
            tracing::warn!(
                "Static directory {} not found; only the API is served",
                dir.display()
            );
            api
        }
        None => api,
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve `router` on `listener` until Ctrl-C
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
