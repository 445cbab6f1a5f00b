//! Onboarding service - speciality catalog, doctor applications and doctor status.
//!
//! Approving an application creates the doctor's account and practice
//! profile and marks the application approved, all in one unit of work.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{
    Actor, ApplicationStatus, DoctorApplication, DoctorProfile, DoctorStatus,
    NewDoctorApplication, NewSpeciality, Password, Role, Speciality,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::repositories::normalize_email;
use crate::infra::UnitOfWork;
use crate::with_transaction;

#[async_trait]
pub trait OnboardingService: Send + Sync {
    async fn create_speciality(&self, actor: Actor, request: NewSpeciality)
        -> AppResult<Speciality>;

    async fn list_specialities(&self) -> AppResult<Vec<Speciality>>;

    async fn get_speciality(&self, id: Uuid) -> AppResult<Speciality>;

    /// Public: a practitioner asks to join
    async fn submit_application(&self, form: NewDoctorApplication)
        -> AppResult<DoctorApplication>;

    async fn list_pending_applications(&self, actor: Actor) -> AppResult<Vec<DoctorApplication>>;

    /// Create the doctor account with `password` and an active, fee-less profile
    async fn approve_application(
        &self,
        actor: Actor,
        id: Uuid,
        password: String,
    ) -> AppResult<DoctorProfile>;

    async fn reject_application(&self, actor: Actor, id: Uuid) -> AppResult<DoctorApplication>;

    async fn set_doctor_status(
        &self,
        actor: Actor,
        doctor_id: Uuid,
        status: DoctorStatus,
    ) -> AppResult<DoctorProfile>;
}

/// Concrete implementation of OnboardingService using Unit of Work.
pub struct OnboardingDesk<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OnboardingDesk<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> OnboardingService for OnboardingDesk<U> {
    async fn create_speciality(
        &self,
        actor: Actor,
        request: NewSpeciality,
    ) -> AppResult<Speciality> {
        actor.authorize(&[Role::Admin])?;
        request.validate()?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Speciality name is required"));
        }
        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let speciality = with_transaction!(self.uow, |tx| {
            tx.specialities().create(name, description).await
        })?;

        tracing::info!(speciality_id = %speciality.id, name = %speciality.name, "Speciality created");
        Ok(speciality)
    }

    async fn list_specialities(&self) -> AppResult<Vec<Speciality>> {
        self.uow.specialities().list().await
    }

    async fn get_speciality(&self, id: Uuid) -> AppResult<Speciality> {
        self.uow
            .specialities()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Speciality")
    }

    async fn submit_application(
        &self,
        form: NewDoctorApplication,
    ) -> AppResult<DoctorApplication> {
        form.validate()?;
        if form.full_name.trim().is_empty() {
            return Err(AppError::validation("Full name is required"));
        }
        let email = normalize_email(&form.email);

        let application = with_transaction!(self.uow, |tx| {
            if !tx.specialities().exists(form.speciality_id).await? {
                return Err(AppError::validation("Speciality does not exist"));
            }

            let doctors = tx.doctors();
            if doctors.find_application_by_email(&email).await?.is_some() {
                return Err(AppError::conflict(
                    "An application with this email already exists",
                ));
            }

            doctors.create_application(form, email).await
        })?;

        tracing::info!(application_id = %application.id, "Doctor application submitted");
        Ok(application)
    }

    async fn list_pending_applications(&self, actor: Actor) -> AppResult<Vec<DoctorApplication>> {
        actor.authorize(&[Role::Admin])?;
        self.uow.doctors().list_pending_applications().await
    }

    async fn approve_application(
        &self,
        actor: Actor,
        id: Uuid,
        password: String,
    ) -> AppResult<DoctorProfile> {
        actor.authorize(&[Role::Admin])?;
        let password_hash = Password::new(&password)?.into_string();

        let profile = with_transaction!(self.uow, |tx| {
            let doctors = tx.doctors();
            let application = doctors
                .find_application(id)
                .await?
                .ok_or_not_found("Application")?;
            application.ensure_pending()?;

            let users = tx.users();
            if users.find_by_email(&application.email).await?.is_some() {
                return Err(AppError::conflict("Email is already registered"));
            }

            let user = users
                .create(
                    application.full_name.clone(),
                    &application.email,
                    password_hash,
                    Role::Doctor,
                )
                .await?;
            let profile = doctors.create_profile(user.id, &application).await?;
            doctors
                .set_application_status(application.id, ApplicationStatus::Approved)
                .await?;

            Ok(profile)
        })?;

        tracing::info!(
            application_id = %id,
            doctor_id = %profile.id,
            admin_id = %actor.id,
            "Doctor application approved"
        );
        Ok(profile)
    }

    async fn reject_application(&self, actor: Actor, id: Uuid) -> AppResult<DoctorApplication> {
        actor.authorize(&[Role::Admin])?;

        let application = with_transaction!(self.uow, |tx| {
            let doctors = tx.doctors();
            let application = doctors
                .find_application(id)
                .await?
                .ok_or_not_found("Application")?;
            application.ensure_pending()?;

            doctors
                .set_application_status(application.id, ApplicationStatus::Rejected)
                .await
        })?;

        tracing::info!(application_id = %id, admin_id = %actor.id, "Doctor application rejected");
        Ok(application)
    }

    async fn set_doctor_status(
        &self,
        actor: Actor,
        doctor_id: Uuid,
        status: DoctorStatus,
    ) -> AppResult<DoctorProfile> {
        actor.authorize(&[Role::Admin])?;

        let profile = with_transaction!(self.uow, |tx| {
            tx.doctors().set_status(doctor_id, status).await
        })?;

        tracing::info!(doctor_id = %profile.id, status = %profile.status, "Doctor status changed");
        Ok(profile)
    }
}
