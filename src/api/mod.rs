//! Goalboard REST API
//!
//! HTTP API layer for Goalboard, built with Axum.
//!
//! # Endpoints
//!
//! ## Sessions
//! - `POST /api/v1/auth/session` - Sign in (custom token or anonymous)
//!
//! ## Objectives
//! - `GET /api/v1/objectives` - The fixed objective catalog
//!
//! ## Progress (bearer session)
//! - `GET /api/v1/progress` - Current progress, list and chart
//! - `POST /api/v1/goals/:id/complete` - Mark an objective complete
//! - `GET /api/v1/view` - HTML page with list and chart
//!
//! ## WebSocket
//! - `GET /api/v1/ws?session=<id>` - Live goal page
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use goalboard::api::{serve, AppState};
//! use goalboard::auth::LocalAuthProvider;
//! use goalboard::config::Config;
//! use goalboard::store::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let database = Database::open(config.storage.backend, config.storage.data_dir.as_ref())?;
//!     let auth = LocalAuthProvider::from_config(&config.auth);
//!
//!     let state = AppState::new(database, config.app.app_id.clone(), auth, config.api.clone());
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use crate::config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::{AppState, ProgressService};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::websocket::websocket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/session", post(routes::session::create_session))
        .route("/objectives", get(routes::objectives::list_objectives))
        .route("/progress", get(routes::progress::get_progress))
        .route("/goals/:id/complete", post(routes::progress::complete_goal))
        .route("/view", get(routes::progress::view_page))
        .route("/ws", get(websocket_handler));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Goalboard API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Goalboard API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
