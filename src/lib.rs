//! # Goalboard
//!
//! A small goal tracker: three fixed objectives, a per-user progress document
//! with live subscription, and a completion chart.
//!
//! ## Flow
//!
//! ```text
//! authenticate → subscribe to progress document → render list + chart
//!      ▲                                                │
//!      └──────── snapshot ◀──── write one field ◀── complete
//! ```
//!
//! ## Modules
//!
//! - [`objectives`]: The fixed objective catalog
//! - [`store`]: Document store with merge-writes and live listeners
//! - [`progress`]: Progress document and the subscribe/write adapter
//! - [`auth`]: Custom-token and anonymous sign-in
//! - [`view`]: Objective list and chart projections
//! - [`tracker`]: Per-user context tying the above together
//! - [`api`] / [`websocket`]: HTTP and live page surface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use goalboard::auth::LocalAuthProvider;
//! use goalboard::progress::DocumentProgressStore;
//! use goalboard::store::MemoryDocumentStore;
//! use goalboard::tracker;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let db = Arc::new(MemoryDocumentStore::new());
//!     let store = Arc::new(DocumentProgressStore::new(db, "default-app-id"));
//!     let provider = LocalAuthProvider::new(HashMap::new(), true);
//!
//!     let Some((mut tracker, mut subscription)) = tracker::setup(store, &provider, None).await else {
//!         return;
//!     };
//!
//!     if let Some(Ok(progress)) = subscription.next().await {
//!         let view = tracker.apply_snapshot(progress);
//!         println!("{}", view.chart.title);
//!     }
//!
//!     tracker.complete_goal("goal_listen").await.ok();
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod objectives;
pub mod progress;
pub mod store;
pub mod tracker;
pub mod view;
pub mod websocket;

// Re-export top-level types for convenience
pub use objectives::{Objective, OBJECTIVES};

pub use store::{
    Database, DocumentPath, DocumentSnapshot, DocumentStore, MemoryDocumentStore,
    SqliteDocumentStore, StorageBackend, StoreError, StoreResult,
};

pub use progress::{DocumentProgressStore, ProgressStore, ProgressSubscription, UserProgress};

pub use auth::{authenticate, AuthError, AuthProvider, LocalAuthProvider, Session};

pub use view::{BarChart, ChartView, GoalItem, GoalView, RenderedView};

pub use tracker::{Completion, GoalTracker, TrackerError};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{ClientMessage, HubConfig, HubError, PageHub, ServerMessage};

pub use config::{Config, ConfigError, LoggingConfig};
