//! Practice service - doctor self-service and the public doctor directory.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::ownership::doctor_profile_of;
use crate::domain::availability::{parse_time, parse_weekday};
use crate::domain::{
    Actor, AvailabilityWindow, DoctorProfile, NewAvailabilityWindow, Role, UpdateDoctorProfile,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

#[async_trait]
pub trait PracticeService: Send + Sync {
    /// Active doctors, for patients choosing whom to book
    async fn list_doctors(&self) -> AppResult<Vec<DoctorProfile>>;

    async fn my_profile(&self, actor: Actor) -> AppResult<DoctorProfile>;

    /// Partial update of the caller's own profile
    async fn update_profile(
        &self,
        actor: Actor,
        changes: UpdateDoctorProfile,
    ) -> AppResult<DoctorProfile>;

    /// Publish a weekly window for the caller
    async fn add_window(
        &self,
        actor: Actor,
        window: NewAvailabilityWindow,
    ) -> AppResult<AvailabilityWindow>;

    /// Windows of any doctor, ordered by weekday then start
    async fn list_windows(&self, doctor_id: Uuid) -> AppResult<Vec<AvailabilityWindow>>;

    async fn my_windows(&self, actor: Actor) -> AppResult<Vec<AvailabilityWindow>>;

    async fn remove_window(&self, actor: Actor, window_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of PracticeService using Unit of Work.
pub struct PracticeManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> PracticeManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn own_profile(&self, actor: Actor) -> AppResult<DoctorProfile> {
        actor.authorize(&[Role::Doctor])?;
        self.uow
            .doctors()
            .find_profile_by_user(actor.id)
            .await?
            .ok_or_not_found("Doctor profile")
    }
}

#[async_trait]
impl<U: UnitOfWork> PracticeService for PracticeManager<U> {
    async fn list_doctors(&self) -> AppResult<Vec<DoctorProfile>> {
        self.uow.doctors().list_active().await
    }

    async fn my_profile(&self, actor: Actor) -> AppResult<DoctorProfile> {
        self.own_profile(actor).await
    }

    async fn update_profile(
        &self,
        actor: Actor,
        changes: UpdateDoctorProfile,
    ) -> AppResult<DoctorProfile> {
        actor.authorize(&[Role::Doctor])?;
        changes.validate()?;

        let profile = with_transaction!(self.uow, |tx| {
            let profile = doctor_profile_of(&tx, actor).await?;

            if let Some(speciality_id) = changes.speciality_id {
                if !tx.specialities().exists(speciality_id).await? {
                    return Err(AppError::validation("Speciality does not exist"));
                }
            }

            tx.doctors().update_profile(profile.id, changes).await
        })?;

        tracing::info!(doctor_id = %profile.id, "Doctor profile updated");
        Ok(profile)
    }

    async fn add_window(
        &self,
        actor: Actor,
        window: NewAvailabilityWindow,
    ) -> AppResult<AvailabilityWindow> {
        actor.authorize(&[Role::Doctor])?;
        window.validate()?;

        let day = parse_weekday(&window.day_of_week)?;
        let start_time = parse_time(&window.start_time)?;
        let end_time = parse_time(&window.end_time)?;
        AvailabilityWindow::check_bounds(start_time, end_time)?;

        let window = with_transaction!(self.uow, |tx| {
            let profile = doctor_profile_of(&tx, actor).await?;
            tx.doctors()
                .add_window(profile.id, day, start_time, end_time)
                .await
        })?;

        tracing::info!(
            doctor_id = %window.doctor_id,
            window_id = %window.id,
            day = %window.day_of_week,
            "Availability window added"
        );
        Ok(window)
    }

    async fn list_windows(&self, doctor_id: Uuid) -> AppResult<Vec<AvailabilityWindow>> {
        self.uow
            .doctors()
            .find_profile(doctor_id)
            .await?
            .ok_or_not_found("Doctor")?;

        self.uow.doctors().list_windows(doctor_id).await
    }

    async fn my_windows(&self, actor: Actor) -> AppResult<Vec<AvailabilityWindow>> {
        let profile = self.own_profile(actor).await?;
        self.uow.doctors().list_windows(profile.id).await
    }

    async fn remove_window(&self, actor: Actor, window_id: Uuid) -> AppResult<()> {
        actor.authorize(&[Role::Doctor])?;

        with_transaction!(self.uow, |tx| {
            let doctors = tx.doctors();
            let window = doctors
                .find_window(window_id)
                .await?
                .ok_or_not_found("Availability window")?;

            let profile = doctor_profile_of(&tx, actor).await?;
            if window.doctor_id != profile.id {
                return Err(AppError::forbidden(
                    "This availability window belongs to another doctor",
                ));
            }

            doctors.delete_window(window.id).await
        })?;

        tracing::info!(window_id = %window_id, "Availability window removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DoctorStatus;
    use crate::infra::{
        AppointmentRepository, DoctorRepository, MockDoctorRepository, SpecialityRepository,
        TransactionContext, UserRepository,
    };
    use crate::infra::unit_of_work::TxFuture;
    use chrono::Utc;

    /// Read-only unit of work over a mocked doctor repository.
    struct ReadOnlyUow {
        doctors: Arc<MockDoctorRepository>,
    }

    #[async_trait]
    impl UnitOfWork for ReadOnlyUow {
        fn users(&self) -> Arc<dyn UserRepository> {
            unimplemented!("not used by these tests")
        }

        fn doctors(&self) -> Arc<dyn DoctorRepository> {
            self.doctors.clone()
        }

        fn appointments(&self) -> Arc<dyn AppointmentRepository> {
            unimplemented!("not used by these tests")
        }

        fn specialities(&self) -> Arc<dyn SpecialityRepository> {
            unimplemented!("not used by these tests")
        }

        async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
        where
            F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
            T: Send,
        {
            Err(AppError::internal("transactions are not available"))
        }
    }

    fn profile(user_id: Uuid) -> DoctorProfile {
        DoctorProfile {
            id: Uuid::new_v4(),
            user_id,
            name: "Dr. Otieno".into(),
            email: "otieno@example.com".into(),
            speciality_id: Uuid::new_v4(),
            bio: None,
            currency: Some("KES".into()),
            consultation_fee: 1500.0,
            experience_years: 7,
            status: DoctorStatus::Active,
            phone: None,
            location: None,
            licence_number: None,
            joined_at: Utc::now(),
        }
    }

    fn manager(doctors: MockDoctorRepository) -> PracticeManager<ReadOnlyUow> {
        PracticeManager::new(Arc::new(ReadOnlyUow {
            doctors: Arc::new(doctors),
        }))
    }

    #[tokio::test]
    async fn test_my_profile_requires_doctor_role() {
        let service = manager(MockDoctorRepository::new());

        let result = service.my_profile(Actor::patient(Uuid::new_v4())).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_my_profile_reads_by_account() {
        let user_id = Uuid::new_v4();
        let expected = profile(user_id);
        let expected_id = expected.id;

        let mut doctors = MockDoctorRepository::new();
        doctors
            .expect_find_profile_by_user()
            .withf(move |id| *id == user_id)
            .returning(move |_| Ok(Some(expected.clone())));

        let found = manager(doctors)
            .my_profile(Actor::doctor(user_id))
            .await
            .unwrap();

        assert_eq!(found.id, expected_id);
    }

    #[tokio::test]
    async fn test_list_windows_of_unknown_doctor() {
        let mut doctors = MockDoctorRepository::new();
        doctors.expect_find_profile().returning(|_| Ok(None));
        doctors.expect_list_windows().never();

        let result = manager(doctors).list_windows(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_window_is_rejected_before_storage() {
        let service = manager(MockDoctorRepository::new());
        let window = NewAvailabilityWindow {
            day_of_week: "Monday".into(),
            start_time: "17:00".into(),
            end_time: "09:00".into(),
        };

        let result = service.add_window(Actor::doctor(Uuid::new_v4()), window).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_weekday_is_rejected() {
        let service = manager(MockDoctorRepository::new());
        let window = NewAvailabilityWindow {
            day_of_week: "Funday".into(),
            start_time: "09:00".into(),
            end_time: "10:00".into(),
        };

        let result = service.add_window(Actor::doctor(Uuid::new_v4()), window).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
