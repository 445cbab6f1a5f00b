//! User domain entity, roles and the authenticated actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Account roles. Fixed when the account is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

text_enum!(Role, "role", {
    Patient => "patient",
    Doctor => "doctor",
    Admin => "admin",
});

/// The `(subject_id, role)` pair handed to services by the authentication
/// boundary. Services trust it and never re-derive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn patient(id: Uuid) -> Self {
        Self::new(id, Role::Patient)
    }

    pub fn doctor(id: Uuid) -> Self {
        Self::new(id, Role::Doctor)
    }

    pub fn admin(id: Uuid) -> Self {
        Self::new(id, Role::Admin)
    }

    /// Fail with `Forbidden` unless the actor's role is in `allowed`.
    pub fn authorize(&self, allowed: &[Role]) -> AppResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::debug!(actor = %self.id, role = %self.role, ?allowed, "Role check failed");
            Err(AppError::forbidden(
                "You do not have permission to access this resource",
            ))
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The actor this account authenticates as
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Display name
    #[schema(example = "Jane Wanjiku")]
    pub name: String,
    /// Email address
    #[schema(example = "jane@example.com")]
    pub email: String,
    /// Account role
    pub role: Role,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
