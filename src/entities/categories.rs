use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::acronym_category_pivot::Entity")]
    Pivots,
}

impl Related<super::acronym_category_pivot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pivots.def()
    }
}

impl Related<super::acronyms::Entity> for Entity {
    fn to() -> RelationDef {
        super::acronym_category_pivot::Relation::Acronym.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::acronym_category_pivot::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
