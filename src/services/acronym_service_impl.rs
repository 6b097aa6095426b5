//! `SeaORM` implementation of the `AcronymService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::Store;
use crate::models::acronym::{Acronym, AcronymInput, AcronymWithUser, Category};
use crate::models::user::{Actor, PublicUser};
use crate::services::acronym_service::{AcronymError, AcronymService};

pub struct SeaOrmAcronymService {
    store: Store,
}

impl SeaOrmAcronymService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_acronym(&self, id: i32) -> Result<Acronym, AcronymError> {
        self.store
            .get_acronym(id)
            .await?
            .ok_or_else(|| AcronymError::acronym(id))
    }
}

fn validate_input(input: &AcronymInput) -> Result<(), AcronymError> {
    if input.short.trim().is_empty() {
        return Err(AcronymError::Validation("short must not be empty".to_string()));
    }
    if input.long.trim().is_empty() {
        return Err(AcronymError::Validation("long must not be empty".to_string()));
    }
    Ok(())
}

fn validate_category_name(name: &str) -> Result<&str, AcronymError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AcronymError::Validation(
            "Category name must not be empty".to_string(),
        ));
    }
    Ok(name)
}

#[async_trait]
impl AcronymService for SeaOrmAcronymService {
    async fn create(&self, actor: &Actor, input: AcronymInput) -> Result<Acronym, AcronymError> {
        validate_input(&input)?;
        let acronym = self
            .store
            .create_acronym(&input.short, &input.long, actor.id)
            .await?;
        info!(acronym_id = acronym.id, user_id = %actor.id, "Created acronym");
        Ok(acronym)
    }

    async fn list(&self) -> Result<Vec<Acronym>, AcronymError> {
        Ok(self.store.list_acronyms().await?)
    }

    async fn get(&self, id: i32) -> Result<Acronym, AcronymError> {
        self.ensure_acronym(id).await
    }

    async fn first(&self) -> Result<Acronym, AcronymError> {
        self.store
            .first_acronym()
            .await?
            .ok_or_else(|| AcronymError::NotFound("Acronym".to_string()))
    }

    async fn search(&self, term: &str) -> Result<Vec<Acronym>, AcronymError> {
        if term.trim().is_empty() {
            return Err(AcronymError::Validation("Missing search term".to_string()));
        }
        Ok(self.store.search_acronyms(term).await?)
    }

    async fn sorted(&self) -> Result<Vec<Acronym>, AcronymError> {
        Ok(self.store.sorted_acronyms().await?)
    }

    async fn most_recent(&self) -> Result<Vec<Acronym>, AcronymError> {
        Ok(self.store.most_recent_acronyms().await?)
    }

    async fn with_users(&self) -> Result<Vec<AcronymWithUser>, AcronymError> {
        let rows = self.store.acronyms_with_users().await?;
        Ok(rows
            .into_iter()
            .map(|(acronym, user)| AcronymWithUser {
                id: acronym.id,
                short: acronym.short,
                long: acronym.long,
                user: user.to_public(),
            })
            .collect())
    }

    async fn raw(&self) -> Result<Vec<Acronym>, AcronymError> {
        Ok(self.store.raw_acronyms().await?)
    }

    async fn owner(&self, id: i32) -> Result<PublicUser, AcronymError> {
        self.store
            .acronym_owner(id)
            .await?
            .map(|user| user.to_public())
            .ok_or_else(|| AcronymError::acronym(id))
    }

    async fn categories(&self, id: i32) -> Result<Vec<Category>, AcronymError> {
        self.store
            .acronym_categories(id)
            .await?
            .ok_or_else(|| AcronymError::acronym(id))
    }

    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        input: AcronymInput,
    ) -> Result<Acronym, AcronymError> {
        validate_input(&input)?;
        let acronym = self
            .store
            .update_acronym(id, &input.short, &input.long, actor.id)
            .await?
            .ok_or_else(|| AcronymError::acronym(id))?;
        debug!(acronym_id = id, user_id = %actor.id, "Updated acronym");
        Ok(acronym)
    }

    async fn update_with_categories(
        &self,
        actor: &Actor,
        id: i32,
        input: AcronymInput,
        names: &[String],
    ) -> Result<Acronym, AcronymError> {
        validate_input(&input)?;
        let (acronym, diff) = self
            .store
            .update_acronym_with_categories(id, &input.short, &input.long, actor.id, names)
            .await?
            .ok_or_else(|| AcronymError::acronym(id))?;
        debug!(
            acronym_id = id,
            attached = ?diff.attach,
            detached = ?diff.detach,
            "Reconciled acronym categories"
        );
        Ok(acronym)
    }

    async fn delete(&self, id: i32) -> Result<(), AcronymError> {
        if !self.store.delete_acronym(id).await? {
            return Err(AcronymError::acronym(id));
        }
        info!(acronym_id = id, "Deleted acronym");
        Ok(())
    }

    async fn attach(&self, acronym_id: i32, category_id: i32) -> Result<(), AcronymError> {
        self.ensure_acronym(acronym_id).await?;
        self.get_category(category_id).await?;
        self.store.attach_category(acronym_id, category_id).await?;
        Ok(())
    }

    async fn attach_by_name(&self, acronym_id: i32, name: &str) -> Result<Category, AcronymError> {
        let name = validate_category_name(name)?;
        self.ensure_acronym(acronym_id).await?;
        Ok(self.store.attach_category_by_name(acronym_id, name).await?)
    }

    async fn detach(&self, acronym_id: i32, category_id: i32) -> Result<(), AcronymError> {
        self.ensure_acronym(acronym_id).await?;
        self.get_category(category_id).await?;
        self.store.detach_category(acronym_id, category_id).await?;
        Ok(())
    }

    async fn create_category(&self, name: &str) -> Result<Category, AcronymError> {
        let name = validate_category_name(name)?;
        Ok(self.store.create_category(name).await?)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AcronymError> {
        Ok(self.store.list_categories().await?)
    }

    async fn get_category(&self, id: i32) -> Result<Category, AcronymError> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| AcronymError::category(id))
    }

    async fn category_acronyms(&self, id: i32) -> Result<Vec<Acronym>, AcronymError> {
        self.store
            .category_acronyms(id)
            .await?
            .ok_or_else(|| AcronymError::category(id))
    }
}
