//! SeaORM entity definitions
//!
//! Database rows, kept separate from the domain models. Text columns holding
//! statuses are decoded into domain enums on the way out.

use std::str::FromStr;

use crate::errors::{AppError, AppResult};

pub mod admin;
pub mod appointment;
pub mod consultation;
pub mod doctor;
pub mod doctor_application;
pub mod doctor_availability;
pub mod patient;
pub mod payment;
pub mod speciality;
pub mod user;

/// Decode a stored text column into its domain enum.
///
/// A value that fails to parse means the row was written outside the
/// application, so it surfaces as an internal error rather than a 400.
pub(crate) fn decode<T>(column: &str, value: &str) -> AppResult<T>
where
    T: FromStr<Err = AppError>,
{
    value.parse().map_err(|_| {
        AppError::internal(format!("Unexpected value '{}' in column {}", value, column))
    })
}
