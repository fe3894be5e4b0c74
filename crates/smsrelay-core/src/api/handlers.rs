//! API handlers for the HTTP REST API

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::error::Error;
use crate::models::{AlertBatch, RelayResult};
use crate::relay::AlertRelay;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Relay driving filter, render and send
    pub relay: Arc<AlertRelay>,
}

impl AppState {
    /// Create handler state around a relay
    pub fn new(relay: AlertRelay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Probe response
#[derive(Serialize)]
pub struct ProbeResponse {
    /// Probe status
    pub status: &'static str,
    /// Time of the probe
    pub timestamp: DateTime<Utc>,
    /// Service name, only on the health probe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<&'static str>,
}

impl ProbeResponse {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            timestamp: Utc::now(),
            service: None,
        }
    }
}

/// Health check endpoint
pub async fn health() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        service: Some(env!("CARGO_PKG_NAME")),
        ..ProbeResponse::new("Healthy")
    })
}

/// Readiness probe
pub async fn ready() -> Json<ProbeResponse> {
    Json(ProbeResponse::new("Ready"))
}

/// Liveness probe
pub async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse::new("Alive"))
}

/// Alertmanager webhook receiver
///
/// Returns the batch counts even when individual sends failed.
pub async fn receive_alerts(
    State(state): State<AppState>,
    Json(batch): Json<AlertBatch>,
) -> Result<Json<RelayResult>, (StatusCode, String)> {
    match state.relay.relay(&batch).await {
        Ok(result) => Ok(Json(result)),
        Err(Error::Validation(msg)) => Err((StatusCode::BAD_REQUEST, msg)),
        Err(e) => {
            error!(error = %e, "Alert relay failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
