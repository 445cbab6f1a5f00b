//! Doctor onboarding application entity.

use sea_orm::entity::prelude::*;

use crate::domain::DoctorApplication;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "doctor_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub gender: Option<String>,
    pub years_of_experience: i32,
    pub licence_number: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub speciality_id: Uuid,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for DoctorApplication {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(DoctorApplication {
            status: super::decode("doctor_applications.status", &model.status)?,
            id: model.id,
            full_name: model.full_name,
            email: model.email,
            phone: model.phone,
            gender: model.gender,
            years_of_experience: model.years_of_experience,
            licence_number: model.licence_number,
            bio: model.bio,
            location: model.location,
            speciality_id: model.speciality_id,
            created_at: model.created_at,
        })
    }
}
