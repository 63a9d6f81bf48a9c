//! Health Routes
//!
//! - GET /health/live: process is up
//! - GET /health/ready: document store answers
//! - GET /health: component status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.database.is_healthy() {
        true => StatusCode::OK,
        false => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Store status, open pages and live sessions
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, storage) = match state.database.is_healthy() {
        true => ("healthy", "ok"),
        false => {
            tracing::warn!(backend = %state.database.backend(), "Document store is not answering");
            ("unhealthy", "error")
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        storage: storage.to_string(),
        backend: state.database.backend().to_string(),
        open_pages: state.open_page_count().await,
        sessions: state.sessions.len().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
