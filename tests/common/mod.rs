//! Shared harness for integration tests: an in-memory SQLite database with
//! every migration applied, the real service container, and seed helpers.

#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use clinic_booking::config::Config;
use clinic_booking::domain::{
    Actor, Appointment, BookAppointment, DoctorProfile, NewAvailabilityWindow,
    NewDoctorApplication, NewSpeciality, UpdateDoctorProfile,
};
use clinic_booking::infra::Database;
use clinic_booking::services::{ServiceContainer, Services};

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const PASSWORD: &str = "correct-horse-battery";

/// 2030-06-10 is a Monday
pub const MONDAY: &str = "2030-06-10";

pub struct TestApp {
    pub config: Config,
    pub database: Arc<Database>,
    pub services: Services,
}

/// Fresh database per call; nothing is shared between tests.
pub async fn spawn() -> TestApp {
    let config = Config::new("sqlite::memory:", JWT_SECRET);
    let database = Database::connect(&config)
        .await
        .expect("in-memory database with migrations");
    let services = Services::from_connection(database.get_connection(), config.clone());

    TestApp {
        config,
        database: Arc::new(database),
        services,
    }
}

impl TestApp {
    pub async fn admin(&self) -> Actor {
        let user = self
            .services
            .auth()
            .create_admin("Clinic Admin".into(), unique_email("admin"), PASSWORD.into())
            .await
            .expect("admin account");
        user.actor()
    }

    pub async fn patient(&self) -> Actor {
        let user = self
            .services
            .auth()
            .register_patient("Amina Wanjiru".into(), unique_email("patient"), PASSWORD.into())
            .await
            .expect("patient account");
        user.actor()
    }

    pub async fn speciality(&self, admin: Actor) -> Uuid {
        self.services
            .onboarding()
            .create_speciality(
                admin,
                NewSpeciality {
                    name: format!("General Practice {}", Uuid::new_v4().simple()),
                    description: None,
                },
            )
            .await
            .expect("speciality")
            .id
    }

    /// Onboard a doctor through the application flow, set their fee and
    /// publish a Monday 09:00-10:00 window.
    pub async fn doctor(&self, admin: Actor, fee: f64) -> (Actor, DoctorProfile) {
        let speciality_id = self.speciality(admin).await;
        let onboarding = self.services.onboarding();

        let application = onboarding
            .submit_application(NewDoctorApplication {
                full_name: "Dr. Otieno".into(),
                email: unique_email("doctor"),
                phone: "+254700000001".into(),
                gender: None,
                years_of_experience: 6,
                licence_number: Some("KMPDC-0001".into()),
                bio: None,
                location: Some("Nairobi".into()),
                speciality_id,
            })
            .await
            .expect("application");

        let profile = onboarding
            .approve_application(admin, application.id, PASSWORD.into())
            .await
            .expect("approved doctor");
        let doctor = Actor::doctor(profile.user_id);

        let practice = self.services.practice();
        let profile = practice
            .update_profile(
                doctor,
                UpdateDoctorProfile {
                    consultation_fee: Some(fee),
                    currency: Some("KES".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("fee set");
        practice
            .add_window(
                doctor,
                NewAvailabilityWindow {
                    day_of_week: "Monday".into(),
                    start_time: "09:00".into(),
                    end_time: "10:00".into(),
                },
            )
            .await
            .expect("monday window");

        (doctor, profile)
    }

    pub async fn book(&self, patient: Actor, doctor_id: Uuid, slot: &str) -> Appointment {
        self.services
            .appointments()
            .book(patient, booking(doctor_id, slot))
            .await
            .expect("booking")
    }
}

pub fn booking(doctor_id: Uuid, slot: &str) -> BookAppointment {
    BookAppointment {
        doctor_id,
        date: MONDAY.into(),
        slot: slot.into(),
        reason: "Persistent headaches".into(),
        consultation_type: None,
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}
