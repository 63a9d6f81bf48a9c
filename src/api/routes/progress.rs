//! Progress Routes
//!
//! All routes require `Authorization: Bearer <session_id>`.
//!
//! - GET /api/v1/progress - Current progress, list and chart
//! - POST /api/v1/goals/:id/complete - Mark an objective complete
//! - GET /api/v1/view - HTML page with the list and chart

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CompleteResponse, ProgressResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::AuthSession;
use crate::api::state::{AppState, ProgressService};
use crate::auth::Session;
use crate::tracker::{Completion, GoalTracker};

/// Tracker seeded with the user's current stored progress
async fn load_tracker(
    state: &AppState,
    session: Session,
) -> ApiResult<GoalTracker<ProgressService>> {
    let progress = state.progress.read(&session.user_id).await?;
    let mut tracker = GoalTracker::with_session(Arc::clone(&state.progress), session);
    tracker.apply_snapshot(progress);
    Ok(tracker)
}

/// GET /api/v1/progress
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
) -> ApiResult<Json<ProgressResponse>> {
    let user_id = session.user_id.clone();
    let mut tracker = load_tracker(&state, session).await?;
    let rendered = tracker.render();

    Ok(Json(ProgressResponse {
        user_id,
        progress: tracker.progress().clone(),
        chart_config: rendered.chart.to_chartjs_config(),
        goals: rendered.goals,
        chart: rendered.chart,
    }))
}

/// POST /api/v1/goals/:id/complete
///
/// 202 when the write was issued, 409 when the objective is already
/// complete (nothing is written), 404 for an unknown objective.
pub async fn complete_goal(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
    Path(goal_id): Path<String>,
) -> ApiResult<(StatusCode, Json<CompleteResponse>)> {
    let tracker = load_tracker(&state, session).await?;

    match tracker.complete_goal(&goal_id).await {
        Ok(Completion::Written) => Ok((
            StatusCode::ACCEPTED,
            Json(CompleteResponse {
                status: "written".to_string(),
                goal_id,
            }),
        )),
        Ok(Completion::AlreadyCompleted) => Err(ApiError::Conflict(format!(
            "Objective '{}' is already complete",
            goal_id
        ))),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/v1/view
pub async fn view_page(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
) -> ApiResult<Html<String>> {
    let mut tracker = load_tracker(&state, session).await?;
    Ok(Html(tracker.render().to_html_page()))
}
