//! Doctor directory, applications and doctor self-service handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::extractors::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::availability::parse_date;
use crate::domain::{
    AvailabilityWindow, DoctorApplication, DoctorProfile, NewAvailabilityWindow,
    NewDoctorApplication, UpdateDoctorProfile,
};
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// `?date=YYYY-MM-DD`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    #[param(example = "2024-06-10")]
    pub date: String,
}

/// Start times already taken on a date
#[derive(Debug, Serialize, ToSchema)]
pub struct BookedSlots {
    pub doctor_id: Uuid,
    #[schema(example = "2024-06-10")]
    pub date: String,
    #[schema(example = json!(["09:00", "10:30"]))]
    pub booked: Vec<String>,
}

/// Public doctor routes
pub fn doctor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_doctors))
        .route("/apply", post(apply))
        .route("/:doctor_id/availability", get(list_availability))
        .route("/:doctor_id/booked_slots", get(booked_slots))
}

/// Routes for the authenticated doctor
pub fn doctor_self_routes() -> Router<AppState> {
    Router::new()
        .route("/me/profile", get(my_profile).patch(update_my_profile))
        .route("/me/availability", post(add_availability).get(my_availability))
        .route("/me/availability/:id", delete(remove_availability))
}

/// List active doctors
#[utoipa::path(
    get,
    path = "/doctors",
    tag = "Doctors",
    responses(
        (status = 200, description = "Active doctors", body = Vec<DoctorProfile>)
    )
)]
pub async fn list_doctors(State(state): State<AppState>) -> AppResult<Json<Vec<DoctorProfile>>> {
    let doctors = state.practice_service.list_doctors().await?;
    Ok(Json(doctors))
}

/// Apply to join the clinic as a doctor
#[utoipa::path(
    post,
    path = "/doctors/apply",
    tag = "Doctors",
    request_body = NewDoctorApplication,
    responses(
        (status = 201, description = "Application submitted", body = DoctorApplication),
        (status = 400, description = "Validation error"),
        (status = 409, description = "An application with this email already exists")
    )
)]
pub async fn apply(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewDoctorApplication>,
) -> AppResult<(StatusCode, Json<DoctorApplication>)> {
    let application = state.onboarding_service.submit_application(payload).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// Weekly availability windows of a doctor
#[utoipa::path(
    get,
    path = "/doctors/{doctor_id}/availability",
    tag = "Doctors",
    params(
        ("doctor_id" = Uuid, Path, description = "Doctor profile ID")
    ),
    responses(
        (status = 200, description = "Availability windows", body = Vec<AvailabilityWindow>),
        (status = 404, description = "Doctor not found")
    )
)]
pub async fn list_availability(
    State(state): State<AppState>,
    ValidatedPath(doctor_id): ValidatedPath<Uuid>,
) -> AppResult<Json<Vec<AvailabilityWindow>>> {
    let windows = state.practice_service.list_windows(doctor_id).await?;
    Ok(Json(windows))
}

/// Start times already held on a date
#[utoipa::path(
    get,
    path = "/doctors/{doctor_id}/booked_slots",
    tag = "Doctors",
    params(
        ("doctor_id" = Uuid, Path, description = "Doctor profile ID"),
        DateQuery
    ),
    responses(
        (status = 200, description = "Booked start times", body = BookedSlots),
        (status = 400, description = "Invalid date"),
        (status = 404, description = "Doctor not found")
    )
)]
pub async fn booked_slots(
    State(state): State<AppState>,
    ValidatedPath(doctor_id): ValidatedPath<Uuid>,
    ValidatedQuery(query): ValidatedQuery<DateQuery>,
) -> AppResult<Json<BookedSlots>> {
    let date = parse_date(&query.date)?;
    let booked = state
        .availability_service
        .booked_times(doctor_id, date)
        .await?;

    Ok(Json(BookedSlots {
        doctor_id,
        date: date.to_string(),
        booked,
    }))
}

/// Get the caller's doctor profile
#[utoipa::path(
    get,
    path = "/doctors/me/profile",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = DoctorProfile),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Doctors only")
    )
)]
pub async fn my_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<DoctorProfile>> {
    let profile = state.practice_service.my_profile(current_user.actor()).await?;
    Ok(Json(profile))
}

/// Update the caller's doctor profile
#[utoipa::path(
    patch,
    path = "/doctors/me/profile",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    request_body = UpdateDoctorProfile,
    responses(
        (status = 200, description = "Profile updated", body = DoctorProfile),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Doctors only")
    )
)]
pub async fn update_my_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateDoctorProfile>,
) -> AppResult<Json<DoctorProfile>> {
    let profile = state
        .practice_service
        .update_profile(current_user.actor(), payload)
        .await?;
    Ok(Json(profile))
}

/// Publish a weekly availability window
#[utoipa::path(
    post,
    path = "/doctors/me/availability",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    request_body = NewAvailabilityWindow,
    responses(
        (status = 201, description = "Window created", body = AvailabilityWindow),
        (status = 400, description = "Invalid day or times"),
        (status = 403, description = "Doctors only")
    )
)]
pub async fn add_availability(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewAvailabilityWindow>,
) -> AppResult<(StatusCode, Json<AvailabilityWindow>)> {
    let window = state
        .practice_service
        .add_window(current_user.actor(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(window)))
}

/// List the caller's availability windows
#[utoipa::path(
    get,
    path = "/doctors/me/availability",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own windows", body = Vec<AvailabilityWindow>),
        (status = 403, description = "Doctors only")
    )
)]
pub async fn my_availability(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AvailabilityWindow>>> {
    let windows = state.practice_service.my_windows(current_user.actor()).await?;
    Ok(Json(windows))
}

/// Delete one of the caller's availability windows
#[utoipa::path(
    delete,
    path = "/doctors/me/availability/{id}",
    tag = "Doctors",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Availability window ID")
    ),
    responses(
        (status = 200, description = "Window removed", body = MessageResponse),
        (status = 403, description = "Window belongs to another doctor"),
        (status = 404, description = "Window not found")
    )
)]
pub async fn remove_availability(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state
        .practice_service
        .remove_window(current_user.actor(), id)
        .await?;
    Ok(Json(MessageResponse::new("Availability window removed")))
}
