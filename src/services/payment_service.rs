//! Payment service - settles approved appointments.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::ownership::ensure_patient_owns;
use crate::config::MAX_PAYMENT_METHOD_LENGTH;
use crate::domain::{Actor, Appointment, LifecycleAction, Payment, ProcessPayment, Role};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// Outcome of a successful payment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentReceipt {
    pub appointment: Appointment,
    pub payment: Payment,
}

#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Patient pays for an approved appointment; it moves to `paid`.
    ///
    /// The amount is the doctor's consultation fee at the time of payment.
    async fn pay(&self, actor: Actor, request: ProcessPayment) -> AppResult<PaymentReceipt>;

    /// Payment recorded for an appointment, visible to the patient, the
    /// doctor and admins
    async fn payment_for(&self, actor: Actor, appointment_id: Uuid) -> AppResult<Payment>;
}

/// Concrete implementation of PaymentService using Unit of Work.
pub struct PaymentGate<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PaymentGate<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn clean_method(method: &str) -> AppResult<String> {
    let method = method.trim().to_lowercase();
    if method.is_empty() || method.chars().count() as u64 > MAX_PAYMENT_METHOD_LENGTH {
        return Err(AppError::validation(format!(
            "Payment method must be 1 to {} characters",
            MAX_PAYMENT_METHOD_LENGTH
        )));
    }
    Ok(method)
}

#[async_trait]
impl<U: UnitOfWork> PaymentService for PaymentGate<U> {
    async fn pay(&self, actor: Actor, request: ProcessPayment) -> AppResult<PaymentReceipt> {
        actor.authorize(&[Role::Patient])?;
        request.validate()?;

        let method = clean_method(&request.payment_method)?;
        let appointment_id = request.appointment_id;

        let receipt = with_transaction!(self.uow, |tx| {
            let appointments = tx.appointments();
            let appointment = appointments
                .find_for_update(appointment_id)
                .await?
                .ok_or_not_found("Appointment")?;
            ensure_patient_owns(actor, appointment.patient_id)?;

            let next = appointment.status.apply(LifecycleAction::Pay)?;
            if appointments.find_payment(appointment.id).await?.is_some() {
                return Err(AppError::conflict("Appointment has already been paid for"));
            }

            let doctor = tx
                .doctors()
                .find_profile(appointment.doctor_id)
                .await?
                .ok_or_not_found("Doctor")?;

            let payment = appointments
                .create_payment(&appointment, doctor.consultation_fee, method)
                .await?;
            let appointment = appointments.set_status(appointment.id, next, None).await?;

            Ok(PaymentReceipt {
                appointment,
                payment,
            })
        })?;

        tracing::info!(
            appointment_id = %receipt.appointment.id,
            transaction_id = %receipt.payment.transaction_id,
            amount = receipt.payment.amount,
            "Payment completed"
        );
        Ok(receipt)
    }

    async fn payment_for(&self, actor: Actor, appointment_id: Uuid) -> AppResult<Payment> {
        let appointment = self
            .uow
            .appointments()
            .find_by_id(appointment_id)
            .await?
            .ok_or_not_found("Appointment")?;

        let allowed = match actor.role {
            Role::Admin => true,
            Role::Patient => appointment.patient_id == actor.id,
            Role::Doctor => self
                .uow
                .doctors()
                .find_profile_by_user(actor.id)
                .await?
                .is_some_and(|profile| profile.id == appointment.doctor_id),
        };
        if !allowed {
            return Err(AppError::forbidden("You do not have access to this payment"));
        }

        self.uow
            .appointments()
            .find_payment(appointment_id)
            .await?
            .ok_or_not_found("Payment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_normalized() {
        assert_eq!(clean_method("  M-Pesa ").unwrap(), "m-pesa");
    }

    #[test]
    fn test_blank_method_is_rejected() {
        assert!(matches!(clean_method("   "), Err(AppError::Validation(_))));
        assert!(matches!(
            clean_method(&"x".repeat(51)),
            Err(AppError::Validation(_))
        ));
    }
}
