//! `SeaORM` implementation of the `PasswordResetService` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clients::mailer::{Email, Mailer};
use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::password_reset::{PasswordResetService, ResetError, ResetRequestOutcome};

pub struct SeaOrmPasswordResetService {
    store: Store,
    mailer: Arc<dyn Mailer>,
    security: SecurityConfig,
    public_url: String,
}

impl SeaOrmPasswordResetService {
    #[must_use]
    pub fn new(
        store: Store,
        mailer: Arc<dyn Mailer>,
        security: SecurityConfig,
        public_url: &str,
    ) -> Self {
        Self {
            store,
            mailer,
            security,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn reset_email(&self, to: &str, token: &str) -> Email {
        let link = format!(
            "{}/resetPassword?token={}",
            self.public_url,
            urlencoding::encode(token)
        );
        Email {
            to: to.to_string(),
            subject: "Reset Your Password".to_string(),
            html: format!(
                "<p>You've requested to reset your password. <a href=\"{link}\">Click here</a> to reset your password.</p>"
            ),
        }
    }
}

#[async_trait]
impl PasswordResetService for SeaOrmPasswordResetService {
    async fn request_reset(&self, email: &str) -> Result<ResetRequestOutcome, ResetError> {
        let Some(user) = self.store.get_user_by_email(email.trim()).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(ResetRequestOutcome::UnknownEmail);
        };

        let token = self.store.create_reset_token(user.id).await?;
        self.mailer
            .send(self.reset_email(&user.email, &token.token))
            .await?;

        info!(user_id = %user.id, "Password reset email sent");
        Ok(ResetRequestOutcome::EmailSent)
    }

    async fn consume(&self, token: &str) -> Result<Option<Uuid>, ResetError> {
        let Some(taken) = self.store.take_reset_token(token).await? else {
            return Ok(None);
        };

        if self.security.reset_token_expired(taken.created_at, Utc::now()) {
            debug!(user_id = %taken.user_id, "Password reset token expired");
            return Ok(None);
        }

        Ok(Some(taken.user_id))
    }

    async fn complete(
        &self,
        user_id: Uuid,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), ResetError> {
        if password != confirm_password {
            return Err(ResetError::PasswordMismatch);
        }
        if password.is_empty() {
            return Err(ResetError::Validation("Password must not be empty".to_string()));
        }

        if self.store.get_user(user_id).await?.is_none() {
            return Err(ResetError::UserNotFound);
        }

        self.store
            .update_user_password(user_id, password, &self.security)
            .await?;

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }
}
