//! Doctor practice entities: profiles, specialities and onboarding applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, AppResult};

/// Whether a doctor accepts new bookings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DoctorStatus {
    Active,
    Inactive,
    Suspended,
}

text_enum!(DoctorStatus, "doctor status", {
    Active => "active",
    Inactive => "inactive",
    Suspended => "suspended",
});

/// Practice profile of a doctor account
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub speciality_id: Uuid,
    pub bio: Option<String>,
    #[schema(example = "KES")]
    pub currency: Option<String>,
    /// Fee charged per consultation, in `currency`
    #[schema(example = 1500.0)]
    pub consultation_fee: f64,
    pub experience_years: i32,
    pub status: DoctorStatus,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub licence_number: Option<String>,
    pub joined_at: DateTime<Utc>,
}

impl DoctorProfile {
    pub fn is_active(&self) -> bool {
        self.status == DoctorStatus::Active
    }

    /// Bookings are only accepted by active doctors.
    pub fn ensure_bookable(&self) -> AppResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(AppError::validation("Doctor is not available for booking"))
        }
    }
}

/// Partial update of a doctor's own profile. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDoctorProfile {
    pub speciality_id: Option<Uuid>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(length(min = 3, max = 8, message = "Currency must be a 3 to 8 letter code"))]
    #[schema(example = "KES")]
    pub currency: Option<String>,
    #[validate(range(min = 0.0, message = "Consultation fee cannot be negative"))]
    #[schema(example = 1500.0)]
    pub consultation_fee: Option<f64>,
    #[validate(range(min = 0, message = "Experience cannot be negative"))]
    pub experience_years: Option<i32>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 64))]
    pub licence_number: Option<String>,
}

/// Medical speciality from the catalog
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Speciality {
    pub id: Uuid,
    #[schema(example = "Cardiology")]
    pub name: String,
    pub description: Option<String>,
}

/// Catalog entry created by an admin
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewSpeciality {
    #[validate(length(min = 1, max = 100, message = "Speciality name must be 1 to 100 characters"))]
    #[schema(example = "Cardiology")]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Review state of a doctor application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(ApplicationStatus, "application status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// Request from a practitioner to join the clinic
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoctorApplication {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub gender: Option<String>,
    pub years_of_experience: i32,
    pub licence_number: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub speciality_id: Uuid,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// Application form submitted by a prospective doctor
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewDoctorApplication {
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    #[schema(example = "Dr. Grace Achieng")]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "grace@example.com")]
    pub email: String,
    #[validate(length(min = 1, max = 32, message = "Phone number is required"))]
    #[schema(example = "+254700000001")]
    pub phone: String,
    pub gender: Option<String>,
    #[validate(range(min = 0, message = "Experience cannot be negative"))]
    pub years_of_experience: i32,
    #[validate(length(max = 64))]
    pub licence_number: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub speciality_id: Uuid,
}

/// Admin decision to onboard an applicant; the password seeds the new account
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ApproveApplication {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "initial-password")]
    pub password: String,
}

/// Admin change of a doctor's booking status
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateDoctorStatus {
    pub status: DoctorStatus,
}

impl DoctorApplication {
    /// Only pending applications can be approved or rejected.
    pub fn ensure_pending(&self) -> AppResult<()> {
        match self.status {
            ApplicationStatus::Pending => Ok(()),
            other => Err(AppError::invalid_transition(format!(
                "Application has already been {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application(status: ApplicationStatus) -> DoctorApplication {
        DoctorApplication {
            id: Uuid::new_v4(),
            full_name: "Dr. Achieng".into(),
            email: "achieng@example.com".into(),
            phone: "+254700000001".into(),
            gender: None,
            years_of_experience: 4,
            licence_number: Some("KMPDC-001".into()),
            bio: None,
            location: Some("Kisumu".into()),
            speciality_id: Uuid::new_v4(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_only_pending_applications_are_reviewable() {
        assert!(application(ApplicationStatus::Pending).ensure_pending().is_ok());
        assert!(matches!(
            application(ApplicationStatus::Approved).ensure_pending(),
            Err(AppError::InvalidTransition(_))
        ));
        assert!(matches!(
            application(ApplicationStatus::Rejected).ensure_pending(),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_negative_fee_fails_validation() {
        let update = UpdateDoctorProfile {
            consultation_fee: Some(-1.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateDoctorProfile {
            consultation_fee: Some(0.0),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_doctor_status_parses_case_insensitively() {
        assert_eq!("Suspended".parse::<DoctorStatus>().unwrap(), DoctorStatus::Suspended);
        assert!("retired".parse::<DoctorStatus>().is_err());
    }
}
