use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::acronym::Acronym;
pub use crate::entities::users::Role;

/// Full user record as loaded from storage. Never serialized directly.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub twitter_url: Option<String>,
    pub role: Role,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<crate::entities::users::Model> for User {
    fn from(model: crate::entities::users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            username: model.username,
            email: model.email,
            profile_picture: model.profile_picture,
            twitter_url: model.twitter_url,
            role: model.role,
            deleted_at: model.deleted_at,
        }
    }
}

impl User {
    #[must_use]
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
        }
    }

    #[must_use]
    pub fn to_public_v2(&self) -> PublicUserV2 {
        PublicUserV2 {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            twitter_url: self.twitter_url.clone(),
        }
    }

    #[must_use]
    pub fn to_actor(&self) -> Actor {
        Actor {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// The authenticated principal of a single request.
///
/// Built once at the authentication boundary (bearer token, session or OAuth
/// callback) and handed to every operation that needs to know who is acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUserV2 {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub twitter_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserWithAcronyms {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub acronyms: Vec<Acronym>,
}

/// Input for creating an account. `password` is plaintext and hashed before storage.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(skip, default = "default_role")]
    pub role: Role,
}

const fn default_role() -> Role {
    Role::Standard
}

impl NewUser {
    #[must_use]
    pub fn standard(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
            email: email.into(),
            twitter_url: None,
            role: Role::Standard,
        }
    }
}
