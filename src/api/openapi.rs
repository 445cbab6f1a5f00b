//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, appointment_handler, auth_handler, doctor_handler, payment_handler,
    speciality_handler,
};
use crate::domain::{
    Appointment, AppointmentStatus, ApplicationStatus, ApproveApplication, AvailabilityWindow,
    BookAppointment, Consultation, ConsultationNotes, ConsultationStatus, ConsultationType,
    DaySchedule, DoctorApplication, DoctorProfile, DoctorStatus, NewAvailabilityWindow,
    NewDoctorApplication, NewSpeciality, OpenSlot, Payment, PaymentStatus, ProcessPayment, Role,
    Speciality, UpdateDoctorProfile, UpdateDoctorStatus, UserResponse,
};
use crate::services::{AppointmentSession, PaymentReceipt, TokenResponse};
use crate::types::MessageResponse;

/// OpenAPI documentation for the clinic booking API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clinic Booking API",
        version = "0.1.0",
        description = "Doctors, weekly availability, appointments, consultations and payments",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::me,
        speciality_handler::list_specialities,
        speciality_handler::get_speciality,
        doctor_handler::list_doctors,
        doctor_handler::apply,
        doctor_handler::list_availability,
        doctor_handler::booked_slots,
        doctor_handler::my_profile,
        doctor_handler::update_my_profile,
        doctor_handler::add_availability,
        doctor_handler::my_availability,
        doctor_handler::remove_availability,
        appointment_handler::book,
        appointment_handler::available_slots,
        appointment_handler::my_appointments,
        appointment_handler::doctor_appointments,
        appointment_handler::cancel,
        appointment_handler::approve,
        appointment_handler::reject,
        appointment_handler::start_virtual,
        appointment_handler::start_physical,
        appointment_handler::end,
        appointment_handler::get_consultation,
        appointment_handler::write_notes,
        payment_handler::process,
        payment_handler::get_payment,
        admin_handler::create_speciality,
        admin_handler::list_applications,
        admin_handler::approve_application,
        admin_handler::reject_application,
        admin_handler::set_doctor_status,
        admin_handler::list_appointments,
        admin_handler::purge_appointment,
    ),
    components(
        schemas(
            Role,
            UserResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            Speciality,
            NewSpeciality,
            DoctorStatus,
            DoctorProfile,
            UpdateDoctorProfile,
            UpdateDoctorStatus,
            ApplicationStatus,
            DoctorApplication,
            NewDoctorApplication,
            ApproveApplication,
            AvailabilityWindow,
            NewAvailabilityWindow,
            OpenSlot,
            DaySchedule,
            doctor_handler::BookedSlots,
            AppointmentStatus,
            ConsultationType,
            Appointment,
            BookAppointment,
            ConsultationStatus,
            Consultation,
            ConsultationNotes,
            AppointmentSession,
            PaymentStatus,
            Payment,
            ProcessPayment,
            PaymentReceipt,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Patient registration and login"),
        (name = "Specialities", description = "Speciality catalog"),
        (name = "Doctors", description = "Doctor directory, applications and self-service"),
        (name = "Appointments", description = "Booking and appointment lifecycle"),
        (name = "Payments", description = "Appointment payments"),
        (name = "Admin", description = "Onboarding and oversight")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
