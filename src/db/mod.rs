use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::models::acronym::{Acronym, Category, CategoryDiff};
use crate::models::user::{NewUser, User};

pub mod migrator;
pub mod repositories;

pub use repositories::password_reset::ResetToken;
pub use repositories::token::IssuedToken;
pub use repositories::user::{generate_token, hash_password};

/// Classify a repository error as a constraint violation, if it is one.
#[must_use]
pub fn constraint_violation(err: &anyhow::Error) -> Option<SqlErr> {
    err.downcast_ref::<DbErr>().and_then(DbErr::sql_err)
}

/// Message of a `DbErr::Custom` raised by an entity hook, if any.
#[must_use]
pub fn hook_rejection(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<DbErr>() {
        Some(DbErr::Custom(msg)) => Some(msg.clone()),
        _ => None,
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        // Cascades on users/acronyms/pivots rely on SQLite enforcing foreign keys.
        conn.execute_unprepared("PRAGMA foreign_keys = ON").await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn reset_repo(&self) -> repositories::password_reset::PasswordResetRepository {
        repositories::password_reset::PasswordResetRepository::new(self.conn.clone())
    }

    fn acronym_repo(&self) -> repositories::acronym::AcronymRepository {
        repositories::acronym::AcronymRepository::new(self.conn.clone())
    }

    fn category_repo(&self) -> repositories::category::CategoryRepository {
        repositories::category::CategoryRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(&self, input: NewUser, security: &SecurityConfig) -> Result<User> {
        self.user_repo().create(input, security).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_with_deleted(&self, id: Uuid) -> Result<Option<User>> {
        self.user_repo().get_by_id_with_deleted(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn find_user_holding(&self, username: &str, email: &str) -> Result<Option<User>> {
        self.user_repo().find_holder(username, email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_password(
        &self,
        id: Uuid,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, security)
            .await
    }

    pub async fn set_user_profile_picture(&self, id: Uuid, filename: &str) -> Result<bool> {
        self.user_repo().set_profile_picture(id, filename).await
    }

    pub async fn soft_delete_user(&self, id: Uuid) -> Result<bool> {
        self.user_repo().soft_delete(id).await
    }

    pub async fn restore_user(&self, id: Uuid) -> Result<bool> {
        self.user_repo().restore(id).await
    }

    pub async fn force_delete_user(&self, id: Uuid) -> Result<bool> {
        self.user_repo().force_delete(id).await
    }

    // ========== Tokens ==========

    pub async fn issue_token(&self, user_id: Uuid) -> Result<IssuedToken> {
        self.token_repo().issue(user_id).await
    }

    pub async fn find_token(&self, token: &str) -> Result<Option<(IssuedToken, User)>> {
        self.token_repo().find_with_user(token).await
    }

    pub async fn count_tokens_for_user(&self, user_id: Uuid) -> Result<u64> {
        self.token_repo().count_for_user(user_id).await
    }

    pub async fn create_reset_token(&self, user_id: Uuid) -> Result<ResetToken> {
        self.reset_repo().create(user_id).await
    }

    pub async fn take_reset_token(&self, token: &str) -> Result<Option<ResetToken>> {
        self.reset_repo().take(token).await
    }

    pub async fn count_reset_tokens(&self) -> Result<u64> {
        self.reset_repo().count().await
    }

    // ========== Acronyms ==========

    pub async fn create_acronym(&self, short: &str, long: &str, user_id: Uuid) -> Result<Acronym> {
        self.acronym_repo().create(short, long, user_id).await
    }

    pub async fn get_acronym(&self, id: i32) -> Result<Option<Acronym>> {
        self.acronym_repo().get(id).await
    }

    pub async fn first_acronym(&self) -> Result<Option<Acronym>> {
        self.acronym_repo().first().await
    }

    pub async fn list_acronyms(&self) -> Result<Vec<Acronym>> {
        self.acronym_repo().list().await
    }

    pub async fn sorted_acronyms(&self) -> Result<Vec<Acronym>> {
        self.acronym_repo().sorted().await
    }

    pub async fn most_recent_acronyms(&self) -> Result<Vec<Acronym>> {
        self.acronym_repo().most_recent().await
    }

    pub async fn search_acronyms(&self, term: &str) -> Result<Vec<Acronym>> {
        self.acronym_repo().search(term).await
    }

    pub async fn acronyms_for_user(&self, user_id: Uuid) -> Result<Vec<Acronym>> {
        self.acronym_repo().by_user(user_id).await
    }

    pub async fn acronyms_with_users(&self) -> Result<Vec<(Acronym, User)>> {
        self.acronym_repo().with_users().await
    }

    pub async fn raw_acronyms(&self) -> Result<Vec<Acronym>> {
        self.acronym_repo().raw().await
    }

    pub async fn acronym_owner(&self, id: i32) -> Result<Option<User>> {
        self.acronym_repo().owner(id).await
    }

    pub async fn acronym_categories(&self, id: i32) -> Result<Option<Vec<Category>>> {
        self.acronym_repo().categories(id).await
    }

    pub async fn update_acronym(
        &self,
        id: i32,
        short: &str,
        long: &str,
        owner: Uuid,
    ) -> Result<Option<Acronym>> {
        self.acronym_repo().update(id, short, long, owner).await
    }

    pub async fn update_acronym_with_categories(
        &self,
        id: i32,
        short: &str,
        long: &str,
        owner: Uuid,
        names: &[String],
    ) -> Result<Option<(Acronym, CategoryDiff)>> {
        self.acronym_repo()
            .update_with_categories(id, short, long, owner, names)
            .await
    }

    pub async fn delete_acronym(&self, id: i32) -> Result<bool> {
        self.acronym_repo().delete(id).await
    }

    // ========== Categories ==========

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        self.category_repo().create(name).await
    }

    pub async fn get_category(&self, id: i32) -> Result<Option<Category>> {
        self.category_repo().get(id).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.category_repo().list().await
    }

    pub async fn category_acronyms(&self, id: i32) -> Result<Option<Vec<Acronym>>> {
        self.category_repo().acronyms(id).await
    }

    pub async fn attach_category(&self, acronym_id: i32, category_id: i32) -> Result<bool> {
        self.category_repo().attach(acronym_id, category_id).await
    }

    pub async fn attach_category_by_name(&self, acronym_id: i32, name: &str) -> Result<Category> {
        self.category_repo().attach_by_name(acronym_id, name).await
    }

    pub async fn detach_category(&self, acronym_id: i32, category_id: i32) -> Result<bool> {
        self.category_repo().detach(acronym_id, category_id).await
    }
}
