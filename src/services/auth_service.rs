//! Domain service for authentication.
//!
//! Covers password login, bearer token resolution, session actor rebuilding
//! and OAuth federation.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::clients::oauth::ExternalIdentity;
use crate::models::user::Actor;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    /// An external identity collides with a local account it cannot sign in as.
    #[error("Account unavailable: {0}")]
    AccountUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        if crate::db::constraint_violation(&err).is_some() {
            return Self::Validation("Username or email already in use".to_string());
        }
        if let Some(msg) = crate::db::hook_rejection(&err) {
            return Self::Validation(msg);
        }
        Self::Internal(err.to_string())
    }
}

/// Bearer token returned by a successful API login.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a new bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the user is unknown or the
    /// password does not match. No token is written in that case.
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError>;

    /// Verifies credentials without issuing a token.
    async fn verify_credentials(&self, username: &str, password: &str)
    -> Result<Actor, AuthError>;

    /// Resolves a bearer token to its non-deleted owner.
    async fn resolve_token(&self, token: &str) -> Result<Option<Actor>, AuthError>;

    /// Rebuilds the actor for a user id stored in a browser session.
    async fn resolve_user(&self, id: Uuid) -> Result<Option<Actor>, AuthError>;

    /// Finds or creates the local account behind a provider identity.
    async fn federated_login(&self, identity: &ExternalIdentity) -> Result<Actor, AuthError>;
}
