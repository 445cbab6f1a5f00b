//! Speciality catalog handlers.

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedPath;
use crate::api::AppState;
use crate::domain::Speciality;
use crate::errors::AppResult;

/// Public catalog routes
pub fn speciality_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_specialities))
        .route("/:id", get(get_speciality))
}

/// List all specialities
#[utoipa::path(
    get,
    path = "/specialities",
    tag = "Specialities",
    responses(
        (status = 200, description = "Speciality catalog", body = Vec<Speciality>)
    )
)]
pub async fn list_specialities(State(state): State<AppState>) -> AppResult<Json<Vec<Speciality>>> {
    let specialities = state.onboarding_service.list_specialities().await?;
    Ok(Json(specialities))
}

/// Get a speciality by ID
#[utoipa::path(
    get,
    path = "/specialities/{id}",
    tag = "Specialities",
    params(
        ("id" = Uuid, Path, description = "Speciality ID")
    ),
    responses(
        (status = 200, description = "Speciality", body = Speciality),
        (status = 404, description = "Speciality not found")
    )
)]
pub async fn get_speciality(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<Uuid>,
) -> AppResult<Json<Speciality>> {
    let speciality = state.onboarding_service.get_speciality(id).await?;
    Ok(Json(speciality))
}
