use sea_orm::entity::prelude::*;

/// One acronym/category association. `(acronym_id, category_id)` is unique.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "acronym_category_pivot")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub acronym_id: i32,

    pub category_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::acronyms::Entity",
        from = "Column::AcronymId",
        to = "super::acronyms::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Acronym,

    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::acronyms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Acronym.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
