//! Objective Routes
//!
//! - GET /api/v1/objectives - The fixed objective catalog

use axum::Json;

use crate::api::dto::ObjectiveListResponse;
use crate::objectives::OBJECTIVES;

/// GET /api/v1/objectives
pub async fn list_objectives() -> Json<ObjectiveListResponse> {
    Json(ObjectiveListResponse {
        objectives: OBJECTIVES.to_vec(),
        total: OBJECTIVES.len(),
    })
}
