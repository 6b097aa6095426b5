//! Domain service for user accounts.

use thiserror::Error;
use uuid::Uuid;

use crate::models::acronym::Acronym;
use crate::models::user::{NewUser, PublicUser, PublicUserV2, User, UserWithAcronyms};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        // Duplicates surface as a plain validation failure rather than a typed conflict.
        if crate::db::constraint_violation(&err).is_some() {
            return Self::Validation("Username or email already in use".to_string());
        }
        if let Some(msg) = crate::db::hook_rejection(&err) {
            return Self::Validation(msg);
        }
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates an account, hashing the supplied password.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Validation`] when the username or email is taken.
    async fn create(&self, input: NewUser) -> Result<PublicUser, UserError>;

    async fn list(&self) -> Result<Vec<PublicUser>, UserError>;

    async fn get(&self, id: Uuid) -> Result<PublicUser, UserError>;

    async fn get_v2(&self, id: Uuid) -> Result<PublicUserV2, UserError>;

    /// Full record for a non-deleted user.
    async fn find(&self, id: Uuid) -> Result<User, UserError>;

    /// Lookup that also returns soft-deleted users.
    async fn find_with_deleted(&self, id: Uuid) -> Result<User, UserError>;

    async fn acronyms(&self, id: Uuid) -> Result<Vec<Acronym>, UserError>;

    async fn with_acronyms(&self) -> Result<Vec<UserWithAcronyms>, UserError>;

    async fn soft_delete(&self, id: Uuid) -> Result<(), UserError>;

    async fn restore(&self, id: Uuid) -> Result<(), UserError>;

    /// Removes the row. Acronyms, pivots and tokens go with it.
    async fn force_delete(&self, id: Uuid) -> Result<(), UserError>;
}
