//! HTTP server: router, shared state and graceful shutdown.
//!
//! Routes:
//! - `GET /`: upload page
//! - `POST /predict`: multipart `image` → `{"caption", "action"}`
//! - `GET /health`: status, version and vocabulary shape

pub mod error;
pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use captioner_core::config::LimitsConfig;
use captioner_core::CaptionProcessor;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub processor: CaptionProcessor,
}

/// Build the application router.
pub fn build_router(processor: CaptionProcessor, limits: &LimitsConfig) -> Router {
    let body_limit = limits.max_file_size_bytes() as usize + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { processor })
}

/// Serve until Ctrl-C, then finish in-flight requests.
pub async fn serve(listener: TcpListener, router: Router) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
