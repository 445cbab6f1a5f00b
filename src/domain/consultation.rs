//! Consultation record attached to a started appointment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::appointment::ConsultationType;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    Ongoing,
    Completed,
    Cancelled,
}

text_enum!(ConsultationStatus, "consultation status", {
    Ongoing => "ongoing",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl ConsultationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConsultationStatus::Ongoing)
    }
}

/// Clinical record of one appointment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Consultation {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub consultation_type: ConsultationType,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub symptoms: Option<String>,
    pub examination: Option<String>,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub status: ConsultationStatus,
}

impl Consultation {
    /// Notes can only be written while the consultation is open.
    pub fn ensure_open(&self) -> AppResult<()> {
        if self.status.is_terminal() {
            Err(AppError::invalid_transition(format!(
                "Consultation is already {}",
                self.status
            )))
        } else {
            Ok(())
        }
    }
}

/// Partial update of the clinical notes. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ConsultationNotes {
    #[validate(length(max = 5000))]
    pub symptoms: Option<String>,
    #[validate(length(max = 5000))]
    pub examination: Option<String>,
    #[validate(length(max = 5000))]
    pub diagnosis: Option<String>,
    #[validate(length(max = 5000))]
    pub prescription: Option<String>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

impl ConsultationNotes {
    pub fn is_empty(&self) -> bool {
        self.symptoms.is_none()
            && self.examination.is_none()
            && self.diagnosis.is_none()
            && self.prescription.is_none()
            && self.notes.is_none()
    }
}
