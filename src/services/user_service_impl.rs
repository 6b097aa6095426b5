//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::info;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::models::acronym::Acronym;
use crate::models::user::{NewUser, PublicUser, PublicUserV2, User, UserWithAcronyms};
use crate::services::user_service::{UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create(&self, input: NewUser) -> Result<PublicUser, UserError> {
        let user = self.store.create_user(input, &self.security).await?;
        info!(user_id = %user.id, username = %user.username, "Created user");
        Ok(user.to_public())
    }

    async fn list(&self) -> Result<Vec<PublicUser>, UserError> {
        let users = self.store.list_users().await?;
        Ok(users.iter().map(User::to_public).collect())
    }

    async fn get(&self, id: Uuid) -> Result<PublicUser, UserError> {
        Ok(self.find(id).await?.to_public())
    }

    async fn get_v2(&self, id: Uuid) -> Result<PublicUserV2, UserError> {
        Ok(self.find(id).await?.to_public_v2())
    }

    async fn find(&self, id: Uuid) -> Result<User, UserError> {
        self.store.get_user(id).await?.ok_or(UserError::NotFound)
    }

    async fn find_with_deleted(&self, id: Uuid) -> Result<User, UserError> {
        self.store
            .get_user_with_deleted(id)
            .await?
            .ok_or(UserError::NotFound)
    }

    async fn acronyms(&self, id: Uuid) -> Result<Vec<Acronym>, UserError> {
        self.find(id).await?;
        Ok(self.store.acronyms_for_user(id).await?)
    }

    async fn with_acronyms(&self) -> Result<Vec<UserWithAcronyms>, UserError> {
        let users = self.store.list_users().await?;

        let fetches = users.into_iter().map(|user| {
            let store = self.store.clone();
            async move {
                let acronyms = store.acronyms_for_user(user.id).await?;
                Ok::<_, anyhow::Error>(UserWithAcronyms {
                    id: user.id,
                    name: user.name,
                    username: user.username,
                    acronyms,
                })
            }
        });

        Ok(try_join_all(fetches).await?)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), UserError> {
        if !self.store.soft_delete_user(id).await? {
            return Err(UserError::NotFound);
        }
        info!(user_id = %id, "Soft-deleted user");
        Ok(())
    }

    async fn restore(&self, id: Uuid) -> Result<(), UserError> {
        if !self.store.restore_user(id).await? {
            return Err(UserError::NotFound);
        }
        info!(user_id = %id, "Restored user");
        Ok(())
    }

    async fn force_delete(&self, id: Uuid) -> Result<(), UserError> {
        if !self.store.force_delete_user(id).await? {
            return Err(UserError::NotFound);
        }
        info!(user_id = %id, "Force-deleted user");
        Ok(())
    }
}
