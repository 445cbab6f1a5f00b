//! Payment records and the settlement gate in front of consultations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::TRANSACTION_ID_PREFIX;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

text_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
});

/// Payment for one appointment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    /// Doctor fee at the moment of payment
    #[schema(example = 1500.0)]
    pub amount: f64,
    #[schema(example = "mpesa")]
    pub payment_method: String,
    pub status: PaymentStatus,
    #[schema(example = "TXN-3f2a9c1e8b7d4e6f9a0b1c2d3e4f5a6b")]
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_settled(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}

/// Payment request made by the patient who booked
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProcessPayment {
    pub appointment_id: Uuid,
    #[validate(length(min = 1, max = 50, message = "Payment method must be 1 to 50 characters"))]
    #[schema(example = "mpesa")]
    pub payment_method: String,
}

/// A consultation may only start once the appointment has a completed payment.
pub fn ensure_settled(payment: Option<&Payment>) -> AppResult<()> {
    match payment {
        Some(payment) if payment.is_settled() => Ok(()),
        Some(payment) => Err(AppError::invalid_transition(format!(
            "Payment for this appointment is {}",
            payment.status
        ))),
        None => Err(AppError::invalid_transition(
            "Payment is required before the consultation can start",
        )),
    }
}

/// Fresh unique transaction reference (`TXN-<32 hex>`).
pub fn new_transaction_id() -> String {
    format!("{}{}", TRANSACTION_ID_PREFIX, Uuid::new_v4().simple())
}
