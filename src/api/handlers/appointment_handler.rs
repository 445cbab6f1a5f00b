//! Appointment lifecycle handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::availability::parse_date;
use crate::domain::{
    Appointment, BookAppointment, Consultation, ConsultationNotes, ConsultationType, DaySchedule,
    Role,
};
use crate::errors::AppResult;
use crate::services::AppointmentSession;

/// `?date=YYYY-MM-DD[&duration=30]`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotQuery {
    #[param(example = "2024-06-10")]
    pub date: String,
    /// Slot length in minutes; the configured default when absent
    #[param(example = 30)]
    pub duration: Option<i64>,
}

/// Appointment routes; all require a token
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/book", post(book))
        .route("/doctor/:doctor_id/available_slots", get(available_slots))
        .route("/mine", get(my_appointments))
        .route("/doctor", get(doctor_appointments))
        .route("/cancel/:id", put(cancel))
        .route("/:id/approve", put(approve))
        .route("/:id/reject", put(reject))
        .route("/:id/start/virtual", put(start_virtual))
        .route("/:id/start/physical", put(start_physical))
        .route("/:id/end", put(end))
        .route("/consultation/:id", get(get_consultation))
        .route("/consultation/:id/notes", put(write_notes))
}

/// Book a slot with a doctor
#[utoipa::path(
    post,
    path = "/appointments/book",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    request_body = BookAppointment,
    responses(
        (status = 201, description = "Appointment booked, pending approval", body = Appointment),
        (status = 400, description = "Validation error or doctor unavailable"),
        (status = 403, description = "Patients only"),
        (status = 409, description = "Time slot already booked")
    )
)]
pub async fn book(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BookAppointment>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let appointment = state
        .appointment_service
        .book(current_user.actor(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Open slots of a doctor on a date
#[utoipa::path(
    get,
    path = "/appointments/doctor/{doctor_id}/available_slots",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(
        ("doctor_id" = Uuid, Path, description = "Doctor profile ID"),
        SlotQuery
    ),
    responses(
        (status = 200, description = "Open slots", body = DaySchedule),
        (status = 400, description = "Invalid date or duration"),
        (status = 404, description = "Doctor not found")
    )
)]
pub async fn available_slots(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(doctor_id): ValidatedPath<Uuid>,
    ValidatedQuery(query): ValidatedQuery<SlotQuery>,
) -> AppResult<Json<DaySchedule>> {
    current_user.actor().authorize(&[Role::Patient])?;
    let date = parse_date(&query.date)?;

    let schedule = state
        .availability_service
        .open_slots(doctor_id, date, query.duration)
        .await?;
    Ok(Json(schedule))
}

/// Appointments booked by the caller, newest first
#[utoipa::path(
    get,
    path = "/appointments/mine",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own bookings", body = Vec<Appointment>),
        (status = 403, description = "Patients only")
    )
)]
pub async fn my_appointments(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Appointment>>> {
    let appointments = state
        .appointment_service
        .list_for_patient(current_user.actor())
        .await?;
    Ok(Json(appointments))
}

/// Appointments assigned to the calling doctor
#[utoipa::path(
    get,
    path = "/appointments/doctor",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Assigned appointments", body = Vec<Appointment>),
        (status = 403, description = "Doctors only")
    )
)]
pub async fn doctor_appointments(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Appointment>>> {
    let appointments = state
        .appointment_service
        .list_for_doctor(current_user.actor())
        .await?;
    Ok(Json(appointments))
}

/// Cancel a pending appointment
#[utoipa::path(
    put,
    path = "/appointments/cancel/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment cancelled", body = Appointment),
        (status = 400, description = "Appointment is no longer pending"),
        (status = 403, description = "Not your appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn cancel(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .appointment_service
        .cancel(current_user.actor(), id)
        .await?;
    Ok(Json(appointment))
}

/// Approve a pending appointment
#[utoipa::path(
    put,
    path = "/appointments/{id}/approve",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment approved", body = Appointment),
        (status = 400, description = "Appointment is not pending"),
        (status = 403, description = "Not your appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn approve(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .appointment_service
        .approve(current_user.actor(), id)
        .await?;
    Ok(Json(appointment))
}

/// Reject a pending appointment
#[utoipa::path(
    put,
    path = "/appointments/{id}/reject",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment rejected", body = Appointment),
        (status = 400, description = "Appointment is not pending"),
        (status = 403, description = "Not your appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn reject(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .appointment_service
        .reject(current_user.actor(), id)
        .await?;
    Ok(Json(appointment))
}

async fn start_with(
    current_user: CurrentUser,
    state: AppState,
    id: Uuid,
    modality: ConsultationType,
) -> AppResult<Json<AppointmentSession>> {
    let session = state
        .appointment_service
        .start(current_user.actor(), id, modality)
        .await?;
    Ok(Json(session))
}

/// Start a virtual consultation
#[utoipa::path(
    put,
    path = "/appointments/{id}/start/virtual",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Consultation started", body = AppointmentSession),
        (status = 400, description = "Appointment is not paid"),
        (status = 403, description = "Not your appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn start_virtual(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<AppointmentSession>> {
    start_with(current_user, state, id, ConsultationType::Virtual).await
}

/// Start a physical consultation
#[utoipa::path(
    put,
    path = "/appointments/{id}/start/physical",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Consultation started", body = AppointmentSession),
        (status = 400, description = "Appointment is not paid"),
        (status = 403, description = "Not your appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn start_physical(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<AppointmentSession>> {
    start_with(current_user, state, id, ConsultationType::Physical).await
}

/// Complete an appointment and close its consultation
#[utoipa::path(
    put,
    path = "/appointments/{id}/end",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment completed", body = AppointmentSession),
        (status = 400, description = "Appointment is not in progress"),
        (status = 403, description = "Not your appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn end(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<AppointmentSession>> {
    let session = state
        .appointment_service
        .end(current_user.actor(), id)
        .await?;
    Ok(Json(session))
}

/// Get a consultation
#[utoipa::path(
    get,
    path = "/appointments/consultation/{id}",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Consultation ID")),
    responses(
        (status = 200, description = "Consultation", body = Consultation),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Consultation not found")
    )
)]
pub async fn get_consultation(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<Consultation>> {
    let consultation = state
        .appointment_service
        .consultation(current_user.actor(), id)
        .await?;
    Ok(Json(consultation))
}

/// Record clinical notes on an ongoing consultation
#[utoipa::path(
    put,
    path = "/appointments/consultation/{id}/notes",
    tag = "Appointments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Consultation ID")),
    request_body = ConsultationNotes,
    responses(
        (status = 200, description = "Notes saved", body = Consultation),
        (status = 400, description = "Consultation is closed or no fields supplied"),
        (status = 403, description = "Not your consultation"),
        (status = 404, description = "Consultation not found")
    )
)]
pub async fn write_notes(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ConsultationNotes>,
) -> AppResult<Json<Consultation>> {
    let consultation = state
        .appointment_service
        .write_notes(current_user.actor(), id, payload)
        .await?;
    Ok(Json(consultation))
}
