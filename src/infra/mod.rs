//! Infrastructure layer - External systems integration
//!
//! Database connection and migrations, repositories, and the Unit of Work
//! that runs a closure inside one transaction.

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{
    AppointmentRepository, AppointmentStore, DoctorRepository, DoctorStore, SpecialityRepository,
    SpecialityStore, UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAppointmentRepository, MockDoctorRepository, MockSpecialityRepository, MockUserRepository,
};
