//! Config-driven identity provider

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use super::{AuthError, AuthProvider, AuthUser};
use crate::config::AuthConfig;

/// Provider backed by a static token table
///
/// Each custom token maps to a fixed user id. Anonymous users get a fresh
/// random id on every sign-in.
pub struct LocalAuthProvider {
    custom_tokens: HashMap<String, String>,
    allow_anonymous: bool,
}

impl LocalAuthProvider {
    pub fn new(custom_tokens: HashMap<String, String>, allow_anonymous: bool) -> Self {
        Self {
            custom_tokens,
            allow_anonymous,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.custom_tokens.clone(), config.allow_anonymous)
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in_with_custom_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let uid = self
            .custom_tokens
            .get(token)
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser {
            uid: uid.clone(),
            anonymous: false,
        })
    }

    async fn sign_in_anonymously(&self) -> Result<AuthUser, AuthError> {
        if !self.allow_anonymous {
            return Err(AuthError::AnonymousDisabled);
        }

        Ok(AuthUser {
            uid: Uuid::new_v4().simple().to_string(),
            anonymous: true,
        })
    }
}
