//! Password reset by email.
//!
//! `Requested -> EmailSent -> LinkFollowed -> TokenConsumed -> PasswordChanged`.
//! A token is deleted as soon as its link is followed, before any new password
//! is supplied.

use thiserror::Error;
use uuid::Uuid;

use crate::clients::mailer::MailError;

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Mail delivery failed: {0}")]
    Mail(#[from] MailError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ResetError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ResetError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetRequestOutcome {
    EmailSent,
    UnknownEmail,
}

#[async_trait::async_trait]
pub trait PasswordResetService: Send + Sync {
    /// Issues a reset token for a known email and mails the link.
    /// Unknown addresses write nothing.
    async fn request_reset(&self, email: &str) -> Result<ResetRequestOutcome, ResetError>;

    /// Takes a token out of storage, returning the user it was issued for.
    /// Unknown (or expired) tokens yield `None`.
    async fn consume(&self, token: &str) -> Result<Option<Uuid>, ResetError>;

    /// Stores a new password for the user whose token was consumed.
    ///
    /// # Errors
    ///
    /// Returns [`ResetError::PasswordMismatch`] when the confirmation differs.
    async fn complete(
        &self,
        user_id: Uuid,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), ResetError>;
}
