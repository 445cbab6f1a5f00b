//! Consultation entity, at most one per appointment.

use sea_orm::entity::prelude::*;

use crate::domain::Consultation;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "consultations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub consultation_type: String,
    pub symptoms: Option<String>,
    pub examination: Option<String>,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub start_time: DateTimeUtc,
    pub end_time: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Consultation {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Consultation {
            consultation_type: super::decode(
                "consultations.consultation_type",
                &model.consultation_type,
            )?,
            status: super::decode("consultations.status", &model.status)?,
            id: model.id,
            appointment_id: model.appointment_id,
            doctor_id: model.doctor_id,
            patient_id: model.patient_id,
            start_time: model.start_time,
            end_time: model.end_time,
            symptoms: model.symptoms,
            examination: model.examination,
            diagnosis: model.diagnosis,
            prescription: model.prescription,
            notes: model.notes,
        })
    }
}
