use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "standard")]
    Standard,

    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Filename under the profile picture directory
    pub profile_picture: Option<String>,

    pub twitter_url: Option<String>,

    pub role: Role,

    /// Set when the account is soft-deleted.
    pub deleted_at: Option<ChronoDateTimeUtc>,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::acronyms::Entity")]
    Acronyms,

    #[sea_orm(has_many = "super::tokens::Entity")]
    Tokens,

    #[sea_orm(has_many = "super::password_reset_tokens::Entity")]
    PasswordResetTokens,
}

impl Related<super::acronyms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Acronyms.def()
    }
}

impl Related<super::tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tokens.def()
    }
}

impl Related<super::password_reset_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PasswordResetTokens.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();

        if insert {
            // Usernames stay unique even across soft-deleted rows.
            if let ActiveValue::Set(username) = &self.username {
                let existing = Entity::find()
                    .filter(Column::Username.eq(username.as_str()))
                    .count(db)
                    .await?;

                if existing > 0 {
                    return Err(DbErr::Custom("Username already exists".to_string()));
                }
            }

            self.created_at = Set(now);
        }

        self.updated_at = Set(now);
        Ok(self)
    }
}
