//! Weekly availability window entity.

use sea_orm::entity::prelude::*;

use crate::domain::availability::parse_weekday;
use crate::domain::AvailabilityWindow;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "doctor_availability")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub doctor_id: Uuid,
    /// Full weekday name, e.g. `Monday`
    pub day_of_week: String,
    pub start_time: Time,
    pub end_time: Time,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for AvailabilityWindow {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let day_of_week = parse_weekday(&model.day_of_week).map_err(|_| {
            AppError::internal(format!(
                "Unexpected value '{}' in column doctor_availability.day_of_week",
                model.day_of_week
            ))
        })?;

        Ok(AvailabilityWindow {
            id: model.id,
            doctor_id: model.doctor_id,
            day_of_week,
            start_time: model.start_time,
            end_time: model.end_time,
        })
    }
}
