use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use super::user::generate_token;
use crate::entities::{password_reset_tokens, prelude::*};

const RESET_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<password_reset_tokens::Model> for ResetToken {
    fn from(model: password_reset_tokens::Model) -> Self {
        Self {
            token: model.token,
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

pub struct PasswordResetRepository {
    conn: DatabaseConnection,
}

impl PasswordResetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: Uuid) -> Result<ResetToken> {
        let model = password_reset_tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            token: Set(generate_token(RESET_TOKEN_BYTES)),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert password reset token")?;

        Ok(ResetToken::from(model))
    }

    /// Find a token and delete it in the same transaction, so it can be taken at most once.
    pub async fn take(&self, token: &str) -> Result<Option<ResetToken>> {
        let txn = self.conn.begin().await?;

        let Some(model) = PasswordResetTokens::find()
            .filter(password_reset_tokens::Column::Token.eq(token))
            .one(&txn)
            .await
            .context("Failed to query password reset token")?
        else {
            txn.rollback().await?;
            return Ok(None);
        };

        PasswordResetTokens::delete_by_id(model.id)
            .exec(&txn)
            .await
            .context("Failed to delete password reset token")?;

        txn.commit().await?;
        Ok(Some(ResetToken::from(model)))
    }

    pub async fn count(&self) -> Result<u64> {
        PasswordResetTokens::find()
            .count(&self.conn)
            .await
            .context("Failed to count password reset tokens")
    }
}
