//! API routes

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Probes
        .route("/health/health", get(handlers::health))
        .route("/health/ready", get(handlers::ready))
        .route("/health/live", get(handlers::live))

        // Alertmanager webhook
        .route("/alert/alert", post(handlers::receive_alerts))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
