//! Appointment entity.
//!
//! `(doctor_id, appointment_time)` is unique among rows in a holding status;
//! see the partial index created by the appointments migration.

use sea_orm::entity::prelude::*;

use crate::domain::Appointment;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_time: DateTime,
    pub reason: String,
    pub status: String,
    pub consultation_type: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Appointment {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let consultation_type = model
            .consultation_type
            .as_deref()
            .map(|value| super::decode("appointments.consultation_type", value))
            .transpose()?;

        Ok(Appointment {
            status: super::decode("appointments.status", &model.status)?,
            consultation_type,
            id: model.id,
            patient_id: model.patient_id,
            doctor_id: model.doctor_id,
            appointment_time: model.appointment_time,
            reason: model.reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
