//! Service Container - Centralized service access.
//!
//! Handlers reach every use case through [`ServiceContainer`]; the concrete
//! [`Services`] wires them all over one shared [`Persistence`].

use std::sync::Arc;

use super::{
    AppointmentService, AuthService, AvailabilityService, OnboardingService, PaymentService,
    PracticeService,
};
use crate::config::Config;
use crate::infra::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn availability(&self) -> Arc<dyn AvailabilityService>;

    fn appointments(&self) -> Arc<dyn AppointmentService>;

    fn payments(&self) -> Arc<dyn PaymentService>;

    fn practice(&self) -> Arc<dyn PracticeService>;

    fn onboarding(&self) -> Arc<dyn OnboardingService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    availability_service: Arc<dyn AvailabilityService>,
    appointment_service: Arc<dyn AppointmentService>,
    payment_service: Arc<dyn PaymentService>,
    practice_service: Arc<dyn PracticeService>,
    onboarding_service: Arc<dyn OnboardingService>,
}

impl Services {
    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{
            Authenticator, AvailabilityResolver, LifecycleManager,
            OnboardingDesk, PaymentGate, PracticeManager,
        };

        let uow = Arc::new(Persistence::new(db));
        let availability_service = Arc::new(AvailabilityResolver::new(
            uow.doctors(),
            uow.appointments(),
            config.slot_duration_minutes,
        ));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            availability_service,
            appointment_service: Arc::new(LifecycleManager::new(uow.clone())),
            payment_service: Arc::new(PaymentGate::new(uow.clone())),
            practice_service: Arc::new(PracticeManager::new(uow.clone())),
            onboarding_service: Arc::new(OnboardingDesk::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn availability(&self) -> Arc<dyn AvailabilityService> {
        self.availability_service.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentService> {
        self.appointment_service.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payment_service.clone()
    }

    fn practice(&self) -> Arc<dyn PracticeService> {
        self.practice_service.clone()
    }

    fn onboarding(&self) -> Arc<dyn OnboardingService> {
        self.onboarding_service.clone()
    }
}
