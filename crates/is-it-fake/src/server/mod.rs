//! HTTP scoring service.

mod errors;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub use errors::ApiError;
pub use state::AppState;

use crate::Detector;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/predict", post(handlers::predict_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(detector: Detector, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(AppState { detector });
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");
    info!("POST /predict - score a job posting");
    info!("GET /health - health check");
    axum::serve(listener, app).await?;
    Ok(())
}
