//! Ownership checks shared by the lifecycle services.

use uuid::Uuid;

use crate::domain::{Actor, DoctorProfile};
use crate::errors::{AppError, AppResult};
use crate::infra::TransactionContext;

/// The patient must be the one who booked.
pub(crate) fn ensure_patient_owns(actor: Actor, patient_id: Uuid) -> AppResult<()> {
    if actor.id == patient_id {
        Ok(())
    } else {
        Err(AppError::forbidden("This appointment belongs to another patient"))
    }
}

/// Practice profile of a doctor actor, read inside the unit of work.
pub(crate) async fn doctor_profile_of(
    tx: &TransactionContext<'_>,
    actor: Actor,
) -> AppResult<DoctorProfile> {
    tx.doctors()
        .find_profile_by_user(actor.id)
        .await?
        .ok_or_else(|| AppError::forbidden("No doctor profile is linked to this account"))
}

/// The doctor actor must own the profile `doctor_id`.
pub(crate) async fn ensure_doctor_owns(
    tx: &TransactionContext<'_>,
    actor: Actor,
    doctor_id: Uuid,
) -> AppResult<()> {
    let profile = doctor_profile_of(tx, actor).await?;
    if profile.id == doctor_id {
        Ok(())
    } else {
        Err(AppError::forbidden("This appointment belongs to another doctor"))
    }
}
