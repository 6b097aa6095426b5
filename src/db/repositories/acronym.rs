use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, ModelTrait, QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use super::category;
use crate::entities::{acronyms, prelude::*};
use crate::models::acronym::{Acronym, Category, CategoryDiff};
use crate::models::user::User;

pub struct AcronymRepository {
    conn: DatabaseConnection,
}

impl AcronymRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert an acronym owned by `user_id`. Fails on the foreign key if the user does not exist.
    pub async fn create(&self, short: &str, long: &str, user_id: Uuid) -> Result<Acronym> {
        let model = acronyms::ActiveModel {
            short: Set(short.to_string()),
            long: Set(long.to_string()),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert acronym")?;

        Ok(Acronym::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Acronym>> {
        let acronym = Acronyms::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query acronym")?;

        Ok(acronym.map(Acronym::from))
    }

    pub async fn first(&self) -> Result<Option<Acronym>> {
        let acronym = Acronyms::find()
            .order_by_asc(acronyms::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query first acronym")?;

        Ok(acronym.map(Acronym::from))
    }

    pub async fn list(&self) -> Result<Vec<Acronym>> {
        self.fetch(Acronyms::find().order_by_asc(acronyms::Column::Id))
            .await
    }

    pub async fn sorted(&self) -> Result<Vec<Acronym>> {
        self.fetch(Acronyms::find().order_by_asc(acronyms::Column::Short))
            .await
    }

    pub async fn most_recent(&self) -> Result<Vec<Acronym>> {
        self.fetch(
            Acronyms::find()
                .order_by_desc(acronyms::Column::UpdatedAt)
                .order_by_desc(acronyms::Column::Id),
        )
        .await
    }

    /// Exact match on either the short or the long form
    pub async fn search(&self, term: &str) -> Result<Vec<Acronym>> {
        self.fetch(
            Acronyms::find()
                .filter(
                    Condition::any()
                        .add(acronyms::Column::Short.eq(term))
                        .add(acronyms::Column::Long.eq(term)),
                )
                .order_by_asc(acronyms::Column::Id),
        )
        .await
    }

    pub async fn by_user(&self, user_id: Uuid) -> Result<Vec<Acronym>> {
        self.fetch(
            Acronyms::find()
                .filter(acronyms::Column::UserId.eq(user_id))
                .order_by_asc(acronyms::Column::Id),
        )
        .await
    }

    /// Acronyms joined with their owners in a single query
    pub async fn with_users(&self) -> Result<Vec<(Acronym, User)>> {
        let rows = Acronyms::find()
            .find_also_related(Users)
            .order_by_asc(acronyms::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query acronyms with users")?;

        Ok(rows
            .into_iter()
            .filter_map(|(acronym, user)| user.map(|u| (Acronym::from(acronym), User::from(u))))
            .collect())
    }

    /// Plain SQL listing that skips the entity layer entirely
    pub async fn raw(&self) -> Result<Vec<Acronym>> {
        let backend = self.conn.get_database_backend();
        Acronym::find_by_statement(Statement::from_string(
            backend,
            "SELECT * FROM acronyms ORDER BY id".to_string(),
        ))
        .all(&self.conn)
        .await
        .context("Failed to run raw acronym query")
    }

    pub async fn owner(&self, id: i32) -> Result<Option<User>> {
        let row = Acronyms::find_by_id(id)
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query acronym owner")?;

        Ok(row.and_then(|(_, user)| user.map(User::from)))
    }

    pub async fn categories(&self, id: i32) -> Result<Option<Vec<Category>>> {
        let Some(acronym) = Acronyms::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query acronym")?
        else {
            return Ok(None);
        };

        Ok(Some(categories_of(&self.conn, &acronym).await?))
    }

    /// Replace the text fields and hand ownership to `owner`
    pub async fn update(
        &self,
        id: i32,
        short: &str,
        long: &str,
        owner: Uuid,
    ) -> Result<Option<Acronym>> {
        update_in(&self.conn, id, short, long, owner).await
    }

    /// Update the acronym and reconcile its category names in one transaction
    pub async fn update_with_categories(
        &self,
        id: i32,
        short: &str,
        long: &str,
        owner: Uuid,
        names: &[String],
    ) -> Result<Option<(Acronym, CategoryDiff)>> {
        let txn = self.conn.begin().await?;

        let Some(acronym) = update_in(&txn, id, short, long, owner).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        let model = Acronyms::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Acronym {id} vanished during update"))?;
        let existing = categories_of(&txn, &model).await?;
        let existing_names: Vec<String> = existing.iter().map(|c| c.name.clone()).collect();

        let diff = CategoryDiff::between(&existing_names, names);

        for name in &diff.attach {
            let category = category::find_or_create(&txn, name).await?;
            category::attach(&txn, id, category.id).await?;
        }

        for name in &diff.detach {
            if let Some(category) = existing.iter().find(|c| &c.name == name) {
                category::detach(&txn, id, category.id).await?;
            }
        }

        txn.commit().await?;
        Ok(Some((acronym, diff)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Acronyms::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete acronym")?;

        Ok(result.rows_affected > 0)
    }

    async fn fetch(&self, select: sea_orm::Select<Acronyms>) -> Result<Vec<Acronym>> {
        let models = select
            .all(&self.conn)
            .await
            .context("Failed to query acronyms")?;

        Ok(models.into_iter().map(Acronym::from).collect())
    }
}

async fn update_in<C>(db: &C, id: i32, short: &str, long: &str, owner: Uuid) -> Result<Option<Acronym>>
where
    C: ConnectionTrait,
{
    let Some(model) = Acronyms::find_by_id(id)
        .one(db)
        .await
        .context("Failed to query acronym for update")?
    else {
        return Ok(None);
    };

    let mut active: acronyms::ActiveModel = model.into();
    active.short = Set(short.to_string());
    active.long = Set(long.to_string());
    active.user_id = Set(owner);

    let updated = active
        .update(db)
        .await
        .context("Failed to update acronym")?;

    Ok(Some(Acronym::from(updated)))
}

async fn categories_of<C>(db: &C, acronym: &acronyms::Model) -> Result<Vec<Category>>
where
    C: ConnectionTrait,
{
    let categories = acronym
        .find_related(Categories)
        .all(db)
        .await
        .context("Failed to query acronym categories")?;

    Ok(categories.into_iter().map(Category::from).collect())
}
