use crate::entities::acronym_category_pivot;
use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

const PIVOT_UNIQUE_INDEX: &str = "idx_acronym_category_pivot_pair";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so the foreign keys resolve.
        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Acronyms)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Categories)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AcronymCategoryPivot)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(PIVOT_UNIQUE_INDEX)
                    .table(AcronymCategoryPivot)
                    .col(acronym_category_pivot::Column::AcronymId)
                    .col(acronym_category_pivot::Column::CategoryId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Tokens)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tokens).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name(PIVOT_UNIQUE_INDEX)
                    .table(AcronymCategoryPivot)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(AcronymCategoryPivot).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Acronyms).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
