//! Tracker error taxonomy

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// Sign-in failed; the tracker stays inert
    #[error("Authentication failed: {0}")]
    AuthFailure(#[from] AuthError),

    /// Registering or consuming the live subscription failed
    #[error("Subscription error: {0}")]
    SubscriptionError(StoreError),

    /// Marking an objective complete failed
    #[error("Write failed: {0}")]
    WriteFailure(StoreError),

    /// An operation that needs a user ran before sign-in
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The objective id is not in the catalog
    #[error("Unknown objective: {0}")]
    UnknownObjective(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
