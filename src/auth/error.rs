//! Authentication errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Token is empty or not known to the provider
    #[error("Invalid custom token")]
    InvalidToken,

    /// Anonymous sign-in is switched off
    #[error("Anonymous sign-in is disabled")]
    AnonymousDisabled,

    /// Session id does not refer to a live session
    #[error("Unknown session")]
    UnknownSession,
}
