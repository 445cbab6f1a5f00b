//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They receive an authenticated [`Actor`] from the
//! request boundary, check its role, and run every read-check-write sequence
//! inside one unit of work.
//!
//! [`Actor`]: crate::domain::Actor

mod appointment_service;
mod auth_service;
mod availability_service;
pub mod container;
mod onboarding_service;
mod ownership;
mod payment_service;
mod practice_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use appointment_service::{AppointmentService, AppointmentSession, LifecycleManager};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use availability_service::{AvailabilityResolver, AvailabilityService};
pub use onboarding_service::{OnboardingDesk, OnboardingService};
pub use payment_service::{PaymentGate, PaymentReceipt, PaymentService};
pub use practice_service::{PracticeManager, PracticeService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
