//! Domain service for acronyms and their categories.

use sea_orm::SqlErr;
use thiserror::Error;

use crate::models::acronym::{Acronym, AcronymInput, AcronymWithUser, Category};
use crate::models::user::{Actor, PublicUser};

#[derive(Debug, Error)]
pub enum AcronymError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Owning user does not exist")]
    UnknownOwner,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AcronymError {
    #[must_use]
    pub fn acronym(id: i32) -> Self {
        Self::NotFound(format!("Acronym {id}"))
    }

    #[must_use]
    pub fn category(id: i32) -> Self {
        Self::NotFound(format!("Category {id}"))
    }
}

impl From<sea_orm::DbErr> for AcronymError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AcronymError {
    fn from(err: anyhow::Error) -> Self {
        match crate::db::constraint_violation(&err) {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => Self::UnknownOwner,
            _ => Self::Internal(err.to_string()),
        }
    }
}

#[async_trait::async_trait]
pub trait AcronymService: Send + Sync {
    /// Creates an acronym owned by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`AcronymError::UnknownOwner`] when the actor has no user row.
    async fn create(&self, actor: &Actor, input: AcronymInput) -> Result<Acronym, AcronymError>;

    async fn list(&self) -> Result<Vec<Acronym>, AcronymError>;

    async fn get(&self, id: i32) -> Result<Acronym, AcronymError>;

    async fn first(&self) -> Result<Acronym, AcronymError>;

    /// Exact match on either the short or the long form.
    async fn search(&self, term: &str) -> Result<Vec<Acronym>, AcronymError>;

    async fn sorted(&self) -> Result<Vec<Acronym>, AcronymError>;

    async fn most_recent(&self) -> Result<Vec<Acronym>, AcronymError>;

    async fn with_users(&self) -> Result<Vec<AcronymWithUser>, AcronymError>;

    async fn raw(&self) -> Result<Vec<Acronym>, AcronymError>;

    async fn owner(&self, id: i32) -> Result<PublicUser, AcronymError>;

    async fn categories(&self, id: i32) -> Result<Vec<Category>, AcronymError>;

    /// Replaces `short`/`long` and reassigns ownership to `actor`.
    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        input: AcronymInput,
    ) -> Result<Acronym, AcronymError>;

    /// Update plus category reconciliation against `names`, in one transaction.
    async fn update_with_categories(
        &self,
        actor: &Actor,
        id: i32,
        input: AcronymInput,
        names: &[String],
    ) -> Result<Acronym, AcronymError>;

    async fn delete(&self, id: i32) -> Result<(), AcronymError>;

    async fn attach(&self, acronym_id: i32, category_id: i32) -> Result<(), AcronymError>;

    async fn attach_by_name(&self, acronym_id: i32, name: &str) -> Result<Category, AcronymError>;

    async fn detach(&self, acronym_id: i32, category_id: i32) -> Result<(), AcronymError>;

    async fn create_category(&self, name: &str) -> Result<Category, AcronymError>;

    async fn list_categories(&self) -> Result<Vec<Category>, AcronymError>;

    async fn get_category(&self, id: i32) -> Result<Category, AcronymError>;

    async fn category_acronyms(&self, id: i32) -> Result<Vec<Acronym>, AcronymError>;
}
