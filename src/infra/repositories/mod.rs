//! Repository layer - Data access abstraction
//!
//! Each aggregate has a pool-level read trait (mockable in tests) with a
//! `*Store` implementation, plus a `Tx*Repository` that reads and writes
//! inside a unit of work.

mod appointment_repository;
mod doctor_repository;
pub(crate) mod entities;
mod speciality_repository;
mod user_repository;

pub use appointment_repository::{
    AppointmentRepository, AppointmentStore, NewAppointment, TxAppointmentRepository, SLOT_TAKEN,
};
pub use doctor_repository::{DoctorRepository, DoctorStore, TxDoctorRepository};
pub use speciality_repository::{SpecialityRepository, SpecialityStore, TxSpecialityRepository};
pub use user_repository::{TxUserRepository, UserRepository, UserStore};
pub(crate) use user_repository::normalize_email;

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use appointment_repository::MockAppointmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use doctor_repository::MockDoctorRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use speciality_repository::MockSpecialityRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
