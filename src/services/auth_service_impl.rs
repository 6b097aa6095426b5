//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clients::oauth::ExternalIdentity;
use crate::config::SecurityConfig;
use crate::db::Store;
use crate::models::user::{Actor, NewUser};
use crate::services::auth_service::{AccessToken, AuthError, AuthService};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.store.issue_token(user.id).await?;
        debug!(user_id = %user.id, "Issued bearer token");

        Ok(AccessToken {
            id: token.id,
            token: token.token,
            user_id: token.user_id,
        })
    }

    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Actor, AuthError> {
        self.store
            .verify_user_password(username, password)
            .await?
            .map(|user| user.to_actor())
            .ok_or(AuthError::InvalidCredentials)
    }

    async fn resolve_token(&self, token: &str) -> Result<Option<Actor>, AuthError> {
        let Some((issued, user)) = self.store.find_token(token).await? else {
            return Ok(None);
        };

        if self.security.bearer_token_expired(issued.created_at, Utc::now()) {
            debug!(user_id = %user.id, "Bearer token expired");
            return Ok(None);
        }

        Ok(Some(user.to_actor()))
    }

    async fn resolve_user(&self, id: Uuid) -> Result<Option<Actor>, AuthError> {
        Ok(self.store.get_user(id).await?.map(|u| u.to_actor()))
    }

    async fn federated_login(&self, identity: &ExternalIdentity) -> Result<Actor, AuthError> {
        if let Some(user) = self.store.get_user_by_username(&identity.username).await? {
            return Ok(user.to_actor());
        }

        if let Some(holder) = self
            .store
            .find_user_holding(&identity.username, &identity.email)
            .await?
        {
            let reason = if holder.username != identity.username {
                "This email address belongs to another account"
            } else {
                "This account has been deleted"
            };
            warn!(
                user_id = %holder.id,
                username = %identity.username,
                reason,
                "Refusing OAuth login"
            );
            return Err(AuthError::AccountUnavailable(reason.to_string()));
        }

        // The generated password is never shown to anyone; the account is only
        // reachable through the provider unless a reset is requested.
        let input = NewUser::standard(
            identity.name.clone(),
            identity.username.clone(),
            Uuid::new_v4().to_string(),
            identity.email.clone(),
        );

        let user = self.store.create_user(input, &self.security).await?;
        info!(user_id = %user.id, username = %user.username, "Created account from OAuth login");

        Ok(user.to_actor())
    }
}
