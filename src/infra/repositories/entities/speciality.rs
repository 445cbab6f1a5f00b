//! Speciality catalog entity.

use sea_orm::entity::prelude::*;

use crate::domain::Speciality;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "specialities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Speciality {
    fn from(model: Model) -> Self {
        Speciality {
            id: model.id,
            name: model.name,
            description: model.description,
        }
    }
}
