//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::objectives::Objective;
use crate::progress::UserProgress;
use crate::view::{BarChart, GoalItem};

// ============================================
// SESSION DTOs
// ============================================

/// Sign-in request; without a token the user signs in anonymously
#[derive(Debug, Default, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Sign-in response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Bearer value for later requests
    pub session_id: String,
    pub user_id: String,
    pub anonymous: bool,
}

// ============================================
// OBJECTIVE DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct ObjectiveListResponse {
    pub objectives: Vec<Objective>,
    pub total: usize,
}

// ============================================
// PROGRESS DTOs
// ============================================

/// Current progress with both rendered projections
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub user_id: String,
    pub progress: UserProgress,
    pub goals: Vec<GoalItem>,
    pub chart: BarChart,
    pub chart_config: serde_json::Value,
}

/// Completion accepted
#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub status: String,
    pub goal_id: String,
}

// ============================================
// HEALTH DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub backend: String,
    pub open_pages: usize,
    pub sessions: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
