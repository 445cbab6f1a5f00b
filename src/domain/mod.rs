//! Domain layer - Core business entities and rules
//!
//! Entities, value objects and the pure rules of the clinic: the appointment
//! state machine, slot enumeration and the payment gate. Nothing in here
//! touches the database or HTTP.

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum stored as text.
macro_rules! text_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Stored/wire representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::errors::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($ty::$variant),)+
                    other => Err($crate::errors::AppError::validation(format!(
                        "Unknown {} '{}'",
                        $label, other
                    ))),
                }
            }
        }
    };
}

pub mod appointment;
pub mod availability;
pub mod consultation;
pub mod doctor;
pub mod password;
pub mod payment;
pub mod user;

pub use appointment::{
    Appointment, AppointmentStatus, BookAppointment, ConsultationType, LifecycleAction,
};
pub use availability::{AvailabilityWindow, DaySchedule, NewAvailabilityWindow, OpenSlot};
pub use consultation::{Consultation, ConsultationNotes, ConsultationStatus};
pub use doctor::{
    ApplicationStatus, ApproveApplication, DoctorApplication, DoctorProfile, DoctorStatus,
    NewDoctorApplication, NewSpeciality, Speciality, UpdateDoctorProfile, UpdateDoctorStatus,
};
pub use password::Password;
pub use payment::{Payment, PaymentStatus, ProcessPayment};
pub use user::{Actor, Role, User, UserResponse};
