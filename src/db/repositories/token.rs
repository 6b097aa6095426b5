use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::user::generate_token;
use crate::entities::{prelude::*, tokens, users};
use crate::models::user::User;

/// Bearer token length in random bytes (hex encoded on the wire)
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<tokens::Model> for IssuedToken {
    fn from(model: tokens::Model) -> Self {
        Self {
            id: model.id,
            token: model.token,
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create a fresh token row for a login event
    pub async fn issue(&self, user_id: Uuid) -> Result<IssuedToken> {
        let model = tokens::ActiveModel {
            id: Set(Uuid::new_v4()),
            token: Set(generate_token(TOKEN_BYTES)),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert bearer token")?;

        Ok(IssuedToken::from(model))
    }

    /// Resolve a token string to its row and its non-deleted owner
    pub async fn find_with_user(&self, token: &str) -> Result<Option<(IssuedToken, User)>> {
        let row = Tokens::find()
            .filter(tokens::Column::Token.eq(token))
            .find_also_related(Users)
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query bearer token")?;

        Ok(row.and_then(|(token, user)| user.map(|u| (IssuedToken::from(token), User::from(u)))))
    }

    pub async fn count_for_user(&self, user_id: Uuid) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        Tokens::find()
            .filter(tokens::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count bearer tokens")
    }
}
