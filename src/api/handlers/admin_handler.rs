//! Admin handlers: catalog, onboarding and appointment oversight.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::{ValidatedJson, ValidatedPath};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    Appointment, ApproveApplication, DoctorApplication, DoctorProfile, NewSpeciality, Speciality,
    UpdateDoctorStatus,
};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Admin routes; all require a token with the admin role
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/specialities", post(create_speciality))
        .route("/applications", get(list_applications))
        .route("/applications/:id/approve", post(approve_application))
        .route("/applications/:id/reject", post(reject_application))
        .route("/doctors/:id/status", patch(set_doctor_status))
        .route("/appointments", get(list_appointments))
        .route("/appointments/:id", delete(purge_appointment))
}

/// Add a speciality to the catalog
#[utoipa::path(
    post,
    path = "/admin/specialities",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = NewSpeciality,
    responses(
        (status = 201, description = "Speciality created", body = Speciality),
        (status = 403, description = "Admins only"),
        (status = 409, description = "Speciality already exists")
    )
)]
pub async fn create_speciality(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewSpeciality>,
) -> AppResult<(StatusCode, Json<Speciality>)> {
    let speciality = state
        .onboarding_service
        .create_speciality(current_user.actor(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(speciality)))
}

/// Pending doctor applications, oldest first
#[utoipa::path(
    get,
    path = "/admin/applications",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending applications", body = Vec<DoctorApplication>),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_applications(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DoctorApplication>>> {
    let applications = state
        .onboarding_service
        .list_pending_applications(current_user.actor())
        .await?;
    Ok(Json(applications))
}

/// Approve an application, creating the doctor account and profile
#[utoipa::path(
    post,
    path = "/admin/applications/{id}/approve",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = ApproveApplication,
    responses(
        (status = 201, description = "Doctor onboarded", body = DoctorProfile),
        (status = 400, description = "Application is not pending"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn approve_application(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ApproveApplication>,
) -> AppResult<(StatusCode, Json<DoctorProfile>)> {
    let profile = state
        .onboarding_service
        .approve_application(current_user.actor(), id, payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Reject an application
#[utoipa::path(
    post,
    path = "/admin/applications/{id}/reject",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application rejected", body = DoctorApplication),
        (status = 400, description = "Application is not pending"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Application not found")
    )
)]
pub async fn reject_application(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<DoctorApplication>> {
    let application = state
        .onboarding_service
        .reject_application(current_user.actor(), id)
        .await?;
    Ok(Json(application))
}

/// Activate, deactivate or suspend a doctor
#[utoipa::path(
    patch,
    path = "/admin/doctors/{id}/status",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Doctor profile ID")),
    request_body = UpdateDoctorStatus,
    responses(
        (status = 200, description = "Status changed", body = DoctorProfile),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Doctor not found")
    )
)]
pub async fn set_doctor_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateDoctorStatus>,
) -> AppResult<Json<DoctorProfile>> {
    let profile = state
        .onboarding_service
        .set_doctor_status(current_user.actor(), id, payload.status)
        .await?;
    Ok(Json(profile))
}

/// Every appointment, newest first
#[utoipa::path(
    get,
    path = "/admin/appointments",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All appointments", body = Vec<Appointment>),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_appointments(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Appointment>>> {
    let appointments = state
        .appointment_service
        .list_all(current_user.actor())
        .await?;
    Ok(Json(appointments))
}

/// Delete an appointment with its consultation and payment
#[utoipa::path(
    delete,
    path = "/admin/appointments/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment deleted", body = MessageResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn purge_appointment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state
        .appointment_service
        .purge(current_user.actor(), id)
        .await?;
    Ok(Json(MessageResponse::new("Appointment deleted")))
}
