//! HTTP request handlers.

pub mod admin_handler;
pub mod appointment_handler;
pub mod auth_handler;
pub mod doctor_handler;
pub mod payment_handler;
pub mod speciality_handler;

pub use admin_handler::admin_routes;
pub use appointment_handler::appointment_routes;
pub use auth_handler::{auth_routes, session_routes};
pub use doctor_handler::{doctor_routes, doctor_self_routes};
pub use payment_handler::payment_routes;
pub use speciality_handler::speciality_routes;
