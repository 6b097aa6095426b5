use crate::entities::prelude::*;
use crate::entities::users;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

pub const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";
const ADMIN_EMAIL: &str = "admin@localhost.com";

fn hash_admin_password() -> Result<String, DbErr> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(ADMIN_PASSWORD.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbErr::Migration(format!("Failed to hash admin password: {e}")))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now();

        let insert = Query::insert()
            .into_table(Users)
            .columns([
                users::Column::Id,
                users::Column::Name,
                users::Column::Username,
                users::Column::PasswordHash,
                users::Column::Email,
                users::Column::Role,
                users::Column::CreatedAt,
                users::Column::UpdatedAt,
            ])
            .values_panic([
                uuid::Uuid::new_v4().into(),
                "Admin".into(),
                ADMIN_USERNAME.into(),
                hash_admin_password()?.into(),
                ADMIN_EMAIL.into(),
                "admin".into(),
                now.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Users)
            .and_where(Expr::col(users::Column::Username).eq(ADMIN_USERNAME))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}
