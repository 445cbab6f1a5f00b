//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{
    AppointmentService, AuthService, AvailabilityService, OnboardingService, PaymentService,
    PracticeService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub availability_service: Arc<dyn AvailabilityService>,
    pub appointment_service: Arc<dyn AppointmentService>,
    pub payment_service: Arc<dyn PaymentService>,
    pub practice_service: Arc<dyn PracticeService>,
    pub onboarding_service: Arc<dyn OnboardingService>,
    /// Database connection, used by the health check
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);
        Self::from_container(&container, database)
    }

    /// Create application state from any service container (mocks in tests).
    pub fn from_container(container: &dyn ServiceContainer, database: Arc<Database>) -> Self {
        Self {
            auth_service: container.auth(),
            availability_service: container.availability(),
            appointment_service: container.appointments(),
            payment_service: container.payments(),
            practice_service: container.practice(),
            onboarding_service: container.onboarding(),
            database,
        }
    }
}
