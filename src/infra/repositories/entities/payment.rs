//! Payment entity, at most one per appointment.

use sea_orm::entity::prelude::*;

use crate::domain::Payment;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub amount: f64,
    pub payment_method: String,
    pub status: String,
    #[sea_orm(unique)]
    pub transaction_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Payment {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Payment {
            status: super::decode("payments.status", &model.status)?,
            id: model.id,
            appointment_id: model.appointment_id,
            doctor_id: model.doctor_id,
            patient_id: model.patient_id,
            amount: model.amount,
            payment_method: model.payment_method,
            transaction_id: model.transaction_id,
            created_at: model.created_at,
        })
    }
}
