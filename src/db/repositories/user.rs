use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tokio::task;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::entities::{prelude::*, users};
use crate::models::user::{NewUser, User};

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new account. The plaintext password is hashed off the async runtime.
    pub async fn create(&self, input: NewUser, security: &SecurityConfig) -> Result<User> {
        let password = input.password;
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;

        let active = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            username: Set(input.username),
            password_hash: Set(password_hash),
            email: Set(input.email),
            profile_picture: Set(None),
            twitter_url: Set(input.twitter_url),
            role: Set(input.role),
            deleted_at: Set(None),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(User::from(model))
    }

    /// Get a non-deleted user by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get a user by ID, soft-deleted rows included
    pub async fn get_by_id_with_deleted(&self, id: Uuid) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID (with deleted)")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Any stored account, soft-deleted included, holding this username or email.
    pub async fn find_holder(&self, username: &str, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(username))
                    .add(users::Column::Email.eq(email)),
            )
            .one(&self.conn)
            .await
            .context("Failed to query users by username or email")?;

        Ok(user.map(User::from))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = Users::find()
            .filter(users::Column::DeletedAt.is_null())
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(users.into_iter().map(User::from).collect())
    }

    /// Verify a username/password pair.
    /// Argon2 verification runs under `spawn_blocking` since it is CPU-bound.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Hash and store a new password for a user
    pub async fn update_password(
        &self,
        id: Uuid,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let password = new_password.to_string();
        let security = security.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn set_profile_picture(&self, id: Uuid, filename: &str) -> Result<bool> {
        let Some(user) = Users::find_by_id(id)
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user for profile picture")?
        else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.profile_picture = Set(Some(filename.to_string()));
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Mark a user deleted. Returns false when no live user has that ID.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let Some(user) = Users::find_by_id(id)
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user for soft delete")?
        else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.deleted_at = Set(Some(chrono::Utc::now()));
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Clear the deletion marker. Returns false when no row has that ID.
    pub async fn restore(&self, id: Uuid) -> Result<bool> {
        let Some(user) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for restore")?
        else {
            return Ok(false);
        };

        if user.deleted_at.is_some() {
            let mut active: users::ActiveModel = user.into();
            active.deleted_at = Set(None);
            active.update(&self.conn).await?;
        }

        Ok(true)
    }

    /// Physically remove the row. Acronyms, pivots and tokens go with it via FK cascade.
    pub async fn force_delete(&self, id: Uuid) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to force delete user")?;

        Ok(result.rows_affected > 0)
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate's default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Generate an opaque random token: `bytes` of OS-seeded randomness, hex encoded.
#[must_use]
pub fn generate_token(bytes: usize) -> String {
    use rand::RngCore;
    use std::fmt::Write;

    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);

    buf.iter()
        .fold(String::with_capacity(bytes * 2), |mut acc, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_hex_of_requested_length() {
        let token = generate_token(32);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_token_is_not_repeated() {
        assert_ne!(generate_token(16), generate_token(16));
    }

    #[test]
    fn test_hash_password_round_trips_through_argon2() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let hash = hash_password("hunter22", Some(&config)).unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"hunter22", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong", &parsed)
                .is_err()
        );
    }
}
