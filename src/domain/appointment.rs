//! Appointment entity and its lifecycle state machine.
//!
//! ```text
//! pending ──approve──▶ approved ──pay──▶ paid ──start──▶ in_progress ──end──▶ completed
//!    │
//!    └──reject / cancel──▶ cancelled
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::DATE_TIME_FORMAT;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Paid,
    InProgress,
    Completed,
    Cancelled,
}

text_enum!(AppointmentStatus, "appointment status", {
    Pending => "pending",
    Approved => "approved",
    Paid => "paid",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

/// Operations that move an appointment between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Approve,
    Reject,
    Cancel,
    Pay,
    Start,
    End,
}

impl LifecycleAction {
    fn verb(&self) -> &'static str {
        match self {
            LifecycleAction::Approve => "approve",
            LifecycleAction::Reject => "reject",
            LifecycleAction::Cancel => "cancel",
            LifecycleAction::Pay => "pay for",
            LifecycleAction::Start => "start",
            LifecycleAction::End => "end",
        }
    }
}

impl AppointmentStatus {
    /// Statuses that keep the `(doctor, time)` pair reserved.
    pub const HOLDING: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Approved,
        AppointmentStatus::Paid,
        AppointmentStatus::InProgress,
    ];

    pub fn holds_slot(&self) -> bool {
        Self::HOLDING.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }

    /// The status reached by applying `action`, or `InvalidTransition`.
    pub fn apply(self, action: LifecycleAction) -> AppResult<AppointmentStatus> {
        use AppointmentStatus::*;
        use LifecycleAction::*;

        match (self, action) {
            (Pending, Approve) => Ok(Approved),
            (Pending, Reject) | (Pending, Cancel) => Ok(Cancelled),
            (Approved, Pay) => Ok(Paid),
            (Paid, Start) => Ok(InProgress),
            (InProgress, End) => Ok(Completed),
            (current, action) => Err(AppError::invalid_transition(format!(
                "Cannot {} an appointment that is {}",
                action.verb(),
                current
            ))),
        }
    }
}

/// How a consultation is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationType {
    Virtual,
    Physical,
}

text_enum!(ConsultationType, "consultation type", {
    Virtual => "virtual",
    Physical => "physical",
});

/// Appointment domain entity
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    /// Patient account that booked
    pub patient_id: Uuid,
    /// Doctor profile being booked
    pub doctor_id: Uuid,
    /// Naive local start of the slot
    #[schema(value_type = String, example = "2024-06-10T09:00:00")]
    pub appointment_time: NaiveDateTime,
    pub reason: String,
    pub status: AppointmentStatus,
    /// Set when the consultation starts
    pub consultation_type: Option<ConsultationType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking request made by a patient
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookAppointment {
    /// Doctor profile to book
    pub doctor_id: Uuid,
    #[schema(example = "2024-06-10")]
    pub date: String,
    /// Slot start, `HH:MM`
    #[schema(example = "09:30")]
    pub slot: String,
    #[validate(length(max = 255, message = "Reason must be at most 255 characters"))]
    #[schema(example = "Persistent headaches")]
    pub reason: String,
    pub consultation_type: Option<ConsultationType>,
}

/// Combine a `YYYY-MM-DD` date and an `HH:MM` slot into a naive timestamp.
pub fn parse_appointment_time(date: &str, slot: &str) -> AppResult<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), slot.trim());
    NaiveDateTime::parse_from_str(&joined, DATE_TIME_FORMAT).map_err(|_| {
        AppError::validation("Invalid date or time format, expected YYYY-MM-DD and HH:MM")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;
    use LifecycleAction::*;

    const ALL_STATUSES: [AppointmentStatus; 6] =
        [Pending, Approved, Paid, InProgress, Completed, Cancelled];
    const ALL_ACTIONS: [LifecycleAction; 6] = [Approve, Reject, Cancel, Pay, Start, End];

    #[test]
    fn test_happy_path() {
        let status = Pending.apply(Approve).unwrap();
        let status = status.apply(Pay).unwrap();
        let status = status.apply(Start).unwrap();
        let status = status.apply(End).unwrap();

        assert_eq!(status, Completed);
    }

    #[test]
    fn test_pending_can_be_rejected_or_cancelled() {
        assert_eq!(Pending.apply(Reject).unwrap(), Cancelled);
        assert_eq!(Pending.apply(Cancel).unwrap(), Cancelled);
    }

    #[test]
    fn test_only_listed_edges_are_legal() {
        let legal = [
            (Pending, Approve),
            (Pending, Reject),
            (Pending, Cancel),
            (Approved, Pay),
            (Paid, Start),
            (InProgress, End),
        ];

        for status in ALL_STATUSES {
            for action in ALL_ACTIONS {
                let result = status.apply(action);
                if legal.contains(&(status, action)) {
                    assert!(result.is_ok(), "{:?} + {:?} should be allowed", status, action);
                } else {
                    assert!(
                        matches!(result, Err(AppError::InvalidTransition(_))),
                        "{:?} + {:?} should be rejected",
                        status,
                        action
                    );
                }
            }
        }
    }

    #[test]
    fn test_terminal_statuses_release_the_slot() {
        for status in ALL_STATUSES {
            assert_eq!(status.holds_slot(), !status.is_terminal());
        }
    }

    #[test]
    fn test_cancel_after_approval_message() {
        let err = Approved.apply(Cancel).unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel an appointment that is approved");
    }

    #[test]
    fn test_status_text_form() {
        assert_eq!(InProgress.as_str(), "in_progress");
        assert_eq!("in_progress".parse::<AppointmentStatus>().unwrap(), InProgress);
        assert_eq!(serde_json::to_value(InProgress).unwrap(), "in_progress");
    }

    #[test]
    fn test_parse_appointment_time() {
        let parsed = parse_appointment_time("2024-06-10", "09:30").unwrap();
        assert_eq!(parsed.to_string(), "2024-06-10 09:30:00");

        assert!(parse_appointment_time("10/06/2024", "09:30").is_err());
        assert!(parse_appointment_time("2024-06-10", "9.30am").is_err());
    }
}
