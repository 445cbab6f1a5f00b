//! Appointment lifecycle manager.
//!
//! Every operation checks the actor's role first, then inside one unit of
//! work: load (`NotFound`), ownership (`Forbidden`), transition
//! (`InvalidTransition`), write.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::ownership::{doctor_profile_of, ensure_doctor_owns, ensure_patient_owns};
use crate::config::MAX_REASON_LENGTH;
use crate::domain::appointment::parse_appointment_time;
use crate::domain::payment::ensure_settled;
use crate::domain::{
    Actor, Appointment, BookAppointment, Consultation, ConsultationNotes, ConsultationType,
    LifecycleAction, Role,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::{NewAppointment, SLOT_TAKEN};
use crate::infra::UnitOfWork;
use crate::with_transaction;

/// An appointment together with its consultation, when there is one
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppointmentSession {
    pub appointment: Appointment,
    pub consultation: Option<Consultation>,
}

#[async_trait]
pub trait AppointmentService: Send + Sync {
    /// Patient books a slot; the appointment starts `pending`
    async fn book(&self, actor: Actor, request: BookAppointment) -> AppResult<Appointment>;

    /// Patient withdraws a pending appointment
    async fn cancel(&self, actor: Actor, id: Uuid) -> AppResult<Appointment>;

    async fn approve(&self, actor: Actor, id: Uuid) -> AppResult<Appointment>;

    /// Doctor declines a pending appointment; it ends up `cancelled`
    async fn reject(&self, actor: Actor, id: Uuid) -> AppResult<Appointment>;

    /// Doctor opens the consultation of a paid appointment
    async fn start(
        &self,
        actor: Actor,
        id: Uuid,
        modality: ConsultationType,
    ) -> AppResult<AppointmentSession>;

    /// Doctor fills in clinical notes; absent fields are left unchanged
    async fn write_notes(
        &self,
        actor: Actor,
        consultation_id: Uuid,
        notes: ConsultationNotes,
    ) -> AppResult<Consultation>;

    /// Doctor completes an appointment and closes its consultation
    async fn end(&self, actor: Actor, id: Uuid) -> AppResult<AppointmentSession>;

    async fn list_for_patient(&self, actor: Actor) -> AppResult<Vec<Appointment>>;

    async fn list_for_doctor(&self, actor: Actor) -> AppResult<Vec<Appointment>>;

    async fn list_all(&self, actor: Actor) -> AppResult<Vec<Appointment>>;

    /// Visible to the patient, the doctor and admins
    async fn consultation(&self, actor: Actor, id: Uuid) -> AppResult<Consultation>;

    /// Admin removes an appointment with its consultation and payment
    async fn purge(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of AppointmentService using Unit of Work.
pub struct LifecycleManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> LifecycleManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// approve / reject: owning doctor, status change only.
    async fn doctor_decision(
        &self,
        actor: Actor,
        id: Uuid,
        action: LifecycleAction,
    ) -> AppResult<Appointment> {
        actor.authorize(&[Role::Doctor])?;

        let appointment = with_transaction!(self.uow, |tx| {
            let appointments = tx.appointments();
            let appointment = appointments
                .find_for_update(id)
                .await?
                .ok_or_not_found("Appointment")?;
            ensure_doctor_owns(&tx, actor, appointment.doctor_id).await?;

            let next = appointment.status.apply(action)?;
            appointments.set_status(appointment.id, next, None).await
        })?;

        tracing::info!(
            appointment_id = %appointment.id,
            ?action,
            status = %appointment.status,
            "Appointment transitioned"
        );
        Ok(appointment)
    }
}

fn clean_reason(reason: &str) -> AppResult<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::validation("Reason for the appointment is required"));
    }
    if reason.chars().count() as u64 > MAX_REASON_LENGTH {
        return Err(AppError::validation(format!(
            "Reason must be at most {} characters",
            MAX_REASON_LENGTH
        )));
    }
    Ok(reason.to_string())
}

#[async_trait]
impl<U: UnitOfWork> AppointmentService for LifecycleManager<U> {
    async fn book(&self, actor: Actor, request: BookAppointment) -> AppResult<Appointment> {
        actor.authorize(&[Role::Patient])?;
        request.validate()?;

        let reason = clean_reason(&request.reason)?;
        let appointment_time = parse_appointment_time(&request.date, &request.slot)?;
        let doctor_id = request.doctor_id;
        let consultation_type = request.consultation_type;

        let appointment = with_transaction!(self.uow, |tx| {
            let doctor = tx
                .doctors()
                .find_profile(doctor_id)
                .await?
                .ok_or_else(|| AppError::validation("Doctor does not exist"))?;
            doctor.ensure_bookable()?;

            let appointments = tx.appointments();
            if appointments
                .find_holding(doctor_id, appointment_time)
                .await?
                .is_some()
            {
                return Err(AppError::conflict(SLOT_TAKEN));
            }

            appointments
                .create(NewAppointment {
                    patient_id: actor.id,
                    doctor_id,
                    appointment_time,
                    reason,
                    consultation_type,
                })
                .await
        })?;

        tracing::info!(
            appointment_id = %appointment.id,
            patient_id = %appointment.patient_id,
            doctor_id = %appointment.doctor_id,
            time = %appointment.appointment_time,
            "Appointment booked"
        );
        Ok(appointment)
    }

    async fn cancel(&self, actor: Actor, id: Uuid) -> AppResult<Appointment> {
        actor.authorize(&[Role::Patient])?;

        let appointment = with_transaction!(self.uow, |tx| {
            let appointments = tx.appointments();
            let appointment = appointments
                .find_for_update(id)
                .await?
                .ok_or_not_found("Appointment")?;
            ensure_patient_owns(actor, appointment.patient_id)?;

            let next = appointment.status.apply(LifecycleAction::Cancel)?;
            appointments.set_status(appointment.id, next, None).await
        })?;

        tracing::info!(appointment_id = %appointment.id, "Appointment cancelled by patient");
        Ok(appointment)
    }

    async fn approve(&self, actor: Actor, id: Uuid) -> AppResult<Appointment> {
        self.doctor_decision(actor, id, LifecycleAction::Approve).await
    }

    async fn reject(&self, actor: Actor, id: Uuid) -> AppResult<Appointment> {
        self.doctor_decision(actor, id, LifecycleAction::Reject).await
    }

    async fn start(
        &self,
        actor: Actor,
        id: Uuid,
        modality: ConsultationType,
    ) -> AppResult<AppointmentSession> {
        actor.authorize(&[Role::Doctor])?;

        let session = with_transaction!(self.uow, |tx| {
            let appointments = tx.appointments();
            let appointment = appointments
                .find_for_update(id)
                .await?
                .ok_or_not_found("Appointment")?;
            ensure_doctor_owns(&tx, actor, appointment.doctor_id).await?;

            let next = appointment.status.apply(LifecycleAction::Start)?;
            let payment = appointments.find_payment(appointment.id).await?;
            ensure_settled(payment.as_ref())?;

            let consultation = appointments
                .create_consultation(&appointment, modality)
                .await?;
            let appointment = appointments
                .set_status(appointment.id, next, Some(modality))
                .await?;

            Ok(AppointmentSession {
                appointment,
                consultation: Some(consultation),
            })
        })?;

        tracing::info!(
            appointment_id = %session.appointment.id,
            modality = %modality,
            "Consultation started"
        );
        Ok(session)
    }

    async fn write_notes(
        &self,
        actor: Actor,
        consultation_id: Uuid,
        notes: ConsultationNotes,
    ) -> AppResult<Consultation> {
        actor.authorize(&[Role::Doctor])?;
        notes.validate()?;
        if notes.is_empty() {
            return Err(AppError::validation("No consultation fields were supplied"));
        }

        with_transaction!(self.uow, |tx| {
            let appointments = tx.appointments();
            let consultation = appointments
                .find_consultation_for_update(consultation_id)
                .await?
                .ok_or_not_found("Consultation")?;
            let profile = doctor_profile_of(&tx, actor).await?;
            if profile.id != consultation.doctor_id {
                return Err(AppError::forbidden(
                    "This consultation belongs to another doctor",
                ));
            }
            consultation.ensure_open()?;

            appointments.update_notes(consultation.id, notes).await
        })
    }

    async fn end(&self, actor: Actor, id: Uuid) -> AppResult<AppointmentSession> {
        actor.authorize(&[Role::Doctor])?;

        let session = with_transaction!(self.uow, |tx| {
            let appointments = tx.appointments();
            let appointment = appointments
                .find_for_update(id)
                .await?
                .ok_or_not_found("Appointment")?;
            ensure_doctor_owns(&tx, actor, appointment.doctor_id).await?;

            let next = appointment.status.apply(LifecycleAction::End)?;
            let appointment = appointments.set_status(appointment.id, next, None).await?;

            let consultation = match appointments
                .find_consultation_by_appointment(appointment.id)
                .await?
            {
                Some(open) if !open.status.is_terminal() => {
                    Some(appointments.close_consultation(open.id).await?)
                }
                other => other,
            };

            Ok(AppointmentSession {
                appointment,
                consultation,
            })
        })?;

        tracing::info!(appointment_id = %session.appointment.id, "Appointment completed");
        Ok(session)
    }

    async fn list_for_patient(&self, actor: Actor) -> AppResult<Vec<Appointment>> {
        actor.authorize(&[Role::Patient])?;
        self.uow.appointments().list_for_patient(actor.id).await
    }

    async fn list_for_doctor(&self, actor: Actor) -> AppResult<Vec<Appointment>> {
        actor.authorize(&[Role::Doctor])?;

        let profile = self
            .uow
            .doctors()
            .find_profile_by_user(actor.id)
            .await?
            .ok_or_else(|| AppError::forbidden("No doctor profile is linked to this account"))?;

        self.uow.appointments().list_for_doctor(profile.id).await
    }

    async fn list_all(&self, actor: Actor) -> AppResult<Vec<Appointment>> {
        actor.authorize(&[Role::Admin])?;
        self.uow.appointments().list_all().await
    }

    async fn consultation(&self, actor: Actor, id: Uuid) -> AppResult<Consultation> {
        actor.authorize(&[Role::Patient, Role::Doctor, Role::Admin])?;

        let consultation = self
            .uow
            .appointments()
            .find_consultation(id)
            .await?
            .ok_or_not_found("Consultation")?;

        let allowed = match actor.role {
            Role::Admin => true,
            Role::Patient => consultation.patient_id == actor.id,
            Role::Doctor => self
                .uow
                .doctors()
                .find_profile_by_user(actor.id)
                .await?
                .is_some_and(|profile| profile.id == consultation.doctor_id),
        };

        if !allowed {
            return Err(AppError::forbidden(
                "You do not have access to this consultation",
            ));
        }
        Ok(consultation)
    }

    async fn purge(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        actor.authorize(&[Role::Admin])?;

        with_transaction!(self.uow, |tx| tx.appointments().delete(id).await)?;

        tracing::warn!(appointment_id = %id, admin_id = %actor.id, "Appointment purged");
        Ok(())
    }
}
