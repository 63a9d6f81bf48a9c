//! Sessions
//!
//! A session is created at sign-in and lives only in process memory.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthError, AuthUser};

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub anonymous: bool,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: AuthUser) -> Self {
        Self {
            user_id: user.uid,
            anonymous: user.anonymous,
            signed_in_at: Utc::now(),
        }
    }
}

/// Sessions older than this are dropped
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Sessions kept at most; the oldest is evicted beyond this
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Largest TTL a `chrono::Duration` can hold
const MAX_TTL_SECS: i64 = i64::MAX / 1000;

/// Server-side table of live sessions, keyed by an opaque session id
///
/// Expired sessions are pruned on every insert and refused on lookup.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SESSION_TTL_SECS, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl_secs: u64, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX).min(MAX_TTL_SECS)),
            max_sessions: max_sessions.max(1),
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.signed_in_at >= self.ttl
    }

    /// Store a session and return its id
    pub async fn insert(&self, session: Session) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, existing| !self.is_expired(existing, now));
        let expired = before - sessions.len();

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, existing)| existing.signed_in_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    sessions.remove(&key);
                    tracing::debug!(session_id = %key, "Evicted oldest session");
                }
                None => break,
            }
        }

        tracing::debug!(
            session_id = %id,
            user_id = %session.user_id,
            expired,
            "Session created"
        );
        sessions.insert(id.clone(), session);
        id
    }

    pub async fn get(&self, session_id: &str) -> Result<Session, AuthError> {
        let sessions = self.sessions.read().await;
        match sessions.get(session_id) {
            Some(session) if !self.is_expired(session, Utc::now()) => Ok(session.clone()),
            _ => Err(AuthError::UnknownSession),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
