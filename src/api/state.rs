//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::{LocalAuthProvider, SessionRegistry};
use crate::config::ApiConfig;
use crate::progress::DocumentProgressStore;
use crate::store::Database;
use crate::websocket::{HubConfig, PageHub};

/// Progress store used by the server
pub type ProgressService = DocumentProgressStore<Database>;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Document database behind the progress store
    pub database: Arc<Database>,
    /// Per-user progress documents
    pub progress: Arc<ProgressService>,
    /// Identity provider for sign-in
    pub auth: Arc<LocalAuthProvider>,
    /// Live sessions keyed by session id
    pub sessions: Arc<SessionRegistry>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Open goal pages
    pub ws_hub: Arc<PageHub>,
}

impl AppState {
    pub fn new(
        database: Database,
        app_id: impl Into<String>,
        auth: LocalAuthProvider,
        config: ApiConfig,
    ) -> Self {
        let database = Arc::new(database);
        let hub_config = HubConfig {
            max_pages: config.max_connections,
        };

        Self {
            progress: Arc::new(DocumentProgressStore::new(Arc::clone(&database), app_id)),
            database,
            auth: Arc::new(auth),
            sessions: Arc::new(SessionRegistry::with_limits(
                config.session_ttl_secs,
                config.max_sessions,
            )),
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub: Arc::new(PageHub::new(hub_config)),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Goal pages currently open over WebSocket
    pub async fn open_page_count(&self) -> usize {
        self.ws_hub.page_count().await
    }
}
