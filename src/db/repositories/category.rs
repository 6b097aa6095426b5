use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{acronym_category_pivot, categories, prelude::*};
use crate::models::acronym::{Acronym, Category};

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, name: &str) -> Result<Category> {
        let model = categories::ActiveModel {
            name: Set(name.trim().to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert category")?;

        Ok(Category::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Category>> {
        let category = Categories::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query category")?;

        Ok(category.map(Category::from))
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let categories = Categories::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list categories")?;

        Ok(categories.into_iter().map(Category::from).collect())
    }

    pub async fn acronyms(&self, id: i32) -> Result<Option<Vec<Acronym>>> {
        let Some(category) = Categories::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query category")?
        else {
            return Ok(None);
        };

        let acronyms = category
            .find_related(Acronyms)
            .all(&self.conn)
            .await
            .context("Failed to query category acronyms")?;

        Ok(Some(acronyms.into_iter().map(Acronym::from).collect()))
    }

    pub async fn attach(&self, acronym_id: i32, category_id: i32) -> Result<bool> {
        attach(&self.conn, acronym_id, category_id).await
    }

    pub async fn attach_by_name(&self, acronym_id: i32, name: &str) -> Result<Category> {
        let category = find_or_create(&self.conn, name).await?;
        attach(&self.conn, acronym_id, category.id).await?;
        Ok(category)
    }

    pub async fn detach(&self, acronym_id: i32, category_id: i32) -> Result<bool> {
        detach(&self.conn, acronym_id, category_id).await
    }
}

/// Idempotent upsert keyed on the exact (trimmed) category name.
pub async fn find_or_create<C>(db: &C, name: &str) -> Result<Category>
where
    C: ConnectionTrait,
{
    let name = name.trim();

    if let Some(existing) = Categories::find()
        .filter(categories::Column::Name.eq(name))
        .order_by_asc(categories::Column::Id)
        .one(db)
        .await
        .context("Failed to query category by name")?
    {
        return Ok(Category::from(existing));
    }

    let model = categories::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("Failed to insert category")?;

    Ok(Category::from(model))
}

/// Create the pivot row if it does not exist yet. Returns true when a row was added.
pub async fn attach<C>(db: &C, acronym_id: i32, category_id: i32) -> Result<bool>
where
    C: ConnectionTrait,
{
    let existing = AcronymCategoryPivot::find()
        .filter(acronym_category_pivot::Column::AcronymId.eq(acronym_id))
        .filter(acronym_category_pivot::Column::CategoryId.eq(category_id))
        .one(db)
        .await
        .context("Failed to query acronym category pivot")?;

    if existing.is_some() {
        return Ok(false);
    }

    acronym_category_pivot::ActiveModel {
        id: Set(Uuid::new_v4()),
        acronym_id: Set(acronym_id),
        category_id: Set(category_id),
    }
    .insert(db)
    .await
    .context("Failed to insert acronym category pivot")?;

    Ok(true)
}

pub async fn detach<C>(db: &C, acronym_id: i32, category_id: i32) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = AcronymCategoryPivot::delete_many()
        .filter(acronym_category_pivot::Column::AcronymId.eq(acronym_id))
        .filter(acronym_category_pivot::Column::CategoryId.eq(category_id))
        .exec(db)
        .await
        .context("Failed to delete acronym category pivot")?;

    Ok(result.rows_affected > 0)
}
