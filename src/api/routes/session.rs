//! Session Routes
//!
//! - POST /api/v1/auth/session - Sign in with a custom token or anonymously

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{SessionResponse, SignInRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth;

/// POST /api/v1/auth/session
///
/// A body with a `token` exchanges it for that user's session; an empty
/// body signs in anonymously. The body is read as JSON whatever the
/// `Content-Type`, and one that does not parse is rejected with 400.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let req = parse_sign_in(&body)?;

    let session = match auth::authenticate(state.auth.as_ref(), req.token.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Authentication error");
            return Err(e.into());
        }
    };

    let user_id = session.user_id.clone();
    let anonymous = session.anonymous;
    let session_id = state.sessions.insert(session).await;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            user_id,
            anonymous,
        }),
    ))
}

fn parse_sign_in(body: &[u8]) -> ApiResult<SignInRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SignInRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Invalid sign-in body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sign_in() {
        assert!(parse_sign_in(b"").unwrap().token.is_none());
        assert!(parse_sign_in(b" \n").unwrap().token.is_none());
        assert!(parse_sign_in(b"{}").unwrap().token.is_none());
        assert_eq!(
            parse_sign_in(br#"{"token": "tok"}"#).unwrap().token.as_deref(),
            Some("tok")
        );
        assert!(matches!(
            parse_sign_in(br#"{"token": 5}"#),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(parse_sign_in(b"token=tok"), Err(ApiError::Validation(_))));
    }
}
