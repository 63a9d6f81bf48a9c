//! # Authentication
//!
//! Sign-in is either a custom token exchanged for a fixed user id, or an
//! anonymous sign-in that mints a fresh user id. [`authenticate`] picks the
//! path the same way at every entry point: a token if one was supplied,
//! anonymous otherwise.

mod error;
mod local;
mod session;

pub use error::AuthError;
pub use local::LocalAuthProvider;
pub use session::{Session, SessionRegistry, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL_SECS};

use async_trait::async_trait;

/// A signed-in user as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub anonymous: bool,
}

/// Identity provider contract
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange a pre-issued token for a user
    async fn sign_in_with_custom_token(&self, token: &str) -> Result<AuthUser, AuthError>;

    /// Create a new anonymous user
    async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError>;
}

/// Sign in with `token` when present, anonymously otherwise
pub async fn authenticate<A: AuthProvider + ?Sized>(
    provider: &A,
    token: Option<&str>,
) -> Result<Session, AuthError> {
    let user = match token {
        Some(token) => provider.sign_in_with_custom_token(token).await?,
        None => provider.sign_in_anonymously().await?,
    };

    tracing::info!(user_id = %user.uid, anonymous = user.anonymous, "Signed in");
    Ok(Session::new(user))
}
