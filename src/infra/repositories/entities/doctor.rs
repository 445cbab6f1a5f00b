//! Doctor profile entity.

use sea_orm::entity::prelude::*;

use crate::domain::DoctorProfile;
use crate::errors::AppResult;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "doctors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub speciality_id: Uuid,
    pub bio: Option<String>,
    pub currency: Option<String>,
    pub consultation_fee: f64,
    pub experience_years: i32,
    pub status: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub licence_number: Option<String>,
    pub joined_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Combine with the owning account into the domain profile.
    pub fn into_profile(self, user: super::user::Model) -> AppResult<DoctorProfile> {
        Ok(DoctorProfile {
            status: super::decode("doctors.status", &self.status)?,
            id: self.id,
            user_id: self.user_id,
            name: user.name,
            email: user.email,
            speciality_id: self.speciality_id,
            bio: self.bio,
            currency: self.currency,
            consultation_fee: self.consultation_fee,
            experience_years: self.experience_years,
            phone: self.phone,
            location: self.location,
            licence_number: self.licence_number,
            joined_at: self.joined_at,
        })
    }
}
