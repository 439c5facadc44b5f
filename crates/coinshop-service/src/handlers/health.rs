//! Health check handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Configured storage backend (`postgres` or `memory`).
    pub storage: &'static str,
}

/// `GET /health`.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "coinshop",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.config.storage_backend.as_str(),
    })
}
