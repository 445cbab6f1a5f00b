//! Payment handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::{ValidatedJson, ValidatedPath};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Payment, ProcessPayment};
use crate::errors::AppResult;
use crate::services::PaymentReceipt;

/// Payment routes; all require a token
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/process", post(process))
        .route("/appointment/:appointment_id", get(get_payment))
}

/// Pay for an approved appointment
#[utoipa::path(
    post,
    path = "/payments/process",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = ProcessPayment,
    responses(
        (status = 201, description = "Payment completed, appointment paid", body = PaymentReceipt),
        (status = 400, description = "Appointment is not approved"),
        (status = 403, description = "Not your appointment"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn process(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProcessPayment>,
) -> AppResult<(StatusCode, Json<PaymentReceipt>)> {
    let receipt = state
        .payment_service
        .pay(current_user.actor(), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Payment recorded for an appointment
#[utoipa::path(
    get,
    path = "/payments/appointment/{appointment_id}",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("appointment_id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Payment", body = Payment),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Appointment or payment not found")
    )
)]
pub async fn get_payment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedPath(appointment_id): ValidatedPath<Uuid>,
) -> AppResult<Json<Payment>> {
    let payment = state
        .payment_service
        .payment_for(current_user.actor(), appointment_id)
        .await?;
    Ok(Json(payment))
}
