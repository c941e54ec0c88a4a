//! Service endpoints: liveness, static process information, metrics snapshot

use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tas_common::metrics::MetricsSnapshot;
use tracing::info;

/// Name reported by the information endpoint
pub const SERVICE_NAME: &str = "tas";

/// Service information response
#[derive(Debug, Serialize)]
pub struct ServiceInformation {
    pub service: String,
    pub version: String,
    pub host: String,
    pub port: u16,
}

/// GET /service/health
///
/// Process liveness only; no dependency checks.
pub async fn health() -> Json<Value> {
    info!("health check requested");
    Json(json!({"result": "ok"}))
}

/// GET /service/information
pub async fn information(State(state): State<AppState>) -> Json<ServiceInformation> {
    info!("service information requested");
    Json(ServiceInformation {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        host: state.config.host.clone(),
        port: state.config.port,
    })
}

/// GET /service/metrics
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
