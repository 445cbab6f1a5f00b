//! Availability resolver - open slots of a doctor on a date.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{MAX_SLOT_DURATION_MINUTES, TIME_FORMAT};
use crate::domain::availability::enumerate_open_slots;
use crate::domain::DaySchedule;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{AppointmentRepository, DoctorRepository};

#[async_trait]
pub trait AvailabilityService: Send + Sync {
    /// Bookable slots of `doctor_id` on `date`. `slot_minutes` falls back to
    /// the configured default.
    async fn open_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot_minutes: Option<i64>,
    ) -> AppResult<DaySchedule>;

    /// `HH:MM` start times already held on `date`
    async fn booked_times(&self, doctor_id: Uuid, date: NaiveDate) -> AppResult<Vec<String>>;
}

/// Read-only resolver over the doctor and appointment repositories.
pub struct AvailabilityResolver {
    doctors: Arc<dyn DoctorRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    default_slot_minutes: i64,
}

impl AvailabilityResolver {
    pub fn new(
        doctors: Arc<dyn DoctorRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        default_slot_minutes: i64,
    ) -> Self {
        Self {
            doctors,
            appointments,
            default_slot_minutes,
        }
    }

    fn slot_length(&self, slot_minutes: Option<i64>) -> AppResult<i64> {
        let minutes = slot_minutes.unwrap_or(self.default_slot_minutes);
        if minutes <= 0 || minutes > MAX_SLOT_DURATION_MINUTES {
            return Err(AppError::validation(format!(
                "Slot duration must be between 1 and {} minutes",
                MAX_SLOT_DURATION_MINUTES
            )));
        }
        Ok(minutes)
    }
}

#[async_trait]
impl AvailabilityService for AvailabilityResolver {
    async fn open_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        slot_minutes: Option<i64>,
    ) -> AppResult<DaySchedule> {
        let minutes = self.slot_length(slot_minutes)?;

        let doctor = self
            .doctors
            .find_profile(doctor_id)
            .await?
            .ok_or_not_found("Doctor")?;
        doctor.ensure_bookable()?;

        let windows = self.doctors.windows_on(doctor_id, date.weekday()).await?;
        if windows.is_empty() {
            return Ok(DaySchedule {
                doctor_id,
                date,
                day_of_week: date.weekday(),
                slot_duration_minutes: minutes,
                has_availability: false,
                slots: Vec::new(),
            });
        }

        let held = self.appointments.held_times_on(doctor_id, date).await?;
        let slots = enumerate_open_slots(date, &windows, &held, Duration::minutes(minutes));

        tracing::debug!(
            doctor_id = %doctor_id,
            %date,
            windows = windows.len(),
            held = held.len(),
            open = slots.len(),
            "Resolved open slots"
        );

        Ok(DaySchedule {
            doctor_id,
            date,
            day_of_week: date.weekday(),
            slot_duration_minutes: minutes,
            has_availability: true,
            slots,
        })
    }

    async fn booked_times(&self, doctor_id: Uuid, date: NaiveDate) -> AppResult<Vec<String>> {
        self.doctors
            .find_profile(doctor_id)
            .await?
            .ok_or_not_found("Doctor")?;

        Ok(self
            .appointments
            .held_times_on(doctor_id, date)
            .await?
            .into_iter()
            .map(|time| time.format(TIME_FORMAT).to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AvailabilityWindow, DoctorProfile, DoctorStatus};
    use crate::infra::{MockAppointmentRepository, MockDoctorRepository};
    use chrono::{NaiveTime, Utc, Weekday};
    use mockall::predicate::eq;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn profile(id: Uuid, status: DoctorStatus) -> DoctorProfile {
        DoctorProfile {
            id,
            user_id: Uuid::new_v4(),
            name: "Dr. Otieno".into(),
            email: "otieno@example.com".into(),
            speciality_id: Uuid::new_v4(),
            bio: None,
            currency: Some("KES".into()),
            consultation_fee: 1500.0,
            experience_years: 7,
            status,
            phone: None,
            location: None,
            licence_number: None,
            joined_at: Utc::now(),
        }
    }

    fn morning_window(doctor_id: Uuid) -> AvailabilityWindow {
        AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id,
            day_of_week: Weekday::Mon,
            start_time: at(9, 0),
            end_time: at(10, 0),
        }
    }

    fn resolver(doctors: MockDoctorRepository, appointments: MockAppointmentRepository) -> AvailabilityResolver {
        AvailabilityResolver::new(Arc::new(doctors), Arc::new(appointments), 30)
    }

    #[tokio::test]
    async fn test_open_slots_exclude_held_times() {
        let doctor_id = Uuid::new_v4();

        let mut doctors = MockDoctorRepository::new();
        doctors
            .expect_find_profile()
            .with(eq(doctor_id))
            .returning(move |id| Ok(Some(profile(id, DoctorStatus::Active))));
        doctors
            .expect_windows_on()
            .with(eq(doctor_id), eq(Weekday::Mon))
            .returning(move |id, _| Ok(vec![morning_window(id)]));

        let mut appointments = MockAppointmentRepository::new();
        appointments
            .expect_held_times_on()
            .with(eq(doctor_id), eq(monday()))
            .returning(|_, date| Ok(vec![date.and_time(at(9, 0))]));

        let schedule = resolver(doctors, appointments)
            .open_slots(doctor_id, monday(), None)
            .await
            .unwrap();

        assert!(schedule.has_availability);
        assert_eq!(schedule.slot_duration_minutes, 30);
        assert_eq!(schedule.slots.len(), 1);
        assert_eq!(schedule.slots[0].start_time, at(9, 30));
        assert_eq!(schedule.slots[0].end_time, at(10, 0));
    }

    #[tokio::test]
    async fn test_day_without_windows_reports_no_availability() {
        let doctor_id = Uuid::new_v4();

        let mut doctors = MockDoctorRepository::new();
        doctors
            .expect_find_profile()
            .returning(|id| Ok(Some(profile(id, DoctorStatus::Active))));
        doctors.expect_windows_on().returning(|_, _| Ok(vec![]));

        let mut appointments = MockAppointmentRepository::new();
        appointments.expect_held_times_on().never();

        let schedule = resolver(doctors, appointments)
            .open_slots(doctor_id, monday(), None)
            .await
            .unwrap();

        assert!(!schedule.has_availability);
        assert!(schedule.slots.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_doctor_is_not_found() {
        let mut doctors = MockDoctorRepository::new();
        doctors.expect_find_profile().returning(|_| Ok(None));

        let result = resolver(doctors, MockAppointmentRepository::new())
            .open_slots(Uuid::new_v4(), monday(), None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_inactive_doctor_is_rejected() {
        let mut doctors = MockDoctorRepository::new();
        doctors
            .expect_find_profile()
            .returning(|id| Ok(Some(profile(id, DoctorStatus::Suspended))));

        let result = resolver(doctors, MockAppointmentRepository::new())
            .open_slots(Uuid::new_v4(), monday(), None)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_non_positive_duration_is_rejected_before_lookup() {
        let mut doctors = MockDoctorRepository::new();
        doctors.expect_find_profile().never();

        let result = resolver(doctors, MockAppointmentRepository::new())
            .open_slots(Uuid::new_v4(), monday(), Some(0))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_booked_times_are_wall_clock_strings() {
        let mut doctors = MockDoctorRepository::new();
        doctors
            .expect_find_profile()
            .returning(|id| Ok(Some(profile(id, DoctorStatus::Active))));

        let mut appointments = MockAppointmentRepository::new();
        appointments
            .expect_held_times_on()
            .returning(|_, date| Ok(vec![date.and_time(at(9, 0)), date.and_time(at(14, 30))]));

        let times = resolver(doctors, appointments)
            .booked_times(Uuid::new_v4(), monday())
            .await
            .unwrap();

        assert_eq!(times, vec!["09:00".to_string(), "14:30".to_string()]);
    }
}
