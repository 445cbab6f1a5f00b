//! Unit of Work pattern implementation.
//!
//! A unit of work runs a closure against one database transaction: commit
//! when the closure returns `Ok`, roll back when it returns `Err`. Every
//! lifecycle transition (read, check, write) happens inside one of these.
//!
//! Closures receive a [`TransactionContext`] and must only touch the store
//! through it. The pool-level repositories run on other connections and do
//! not see uncommitted writes.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction,
    IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::repositories::{
    AppointmentRepository, AppointmentStore, DoctorRepository, DoctorStore, SpecialityRepository,
    SpecialityStore, TxAppointmentRepository, TxDoctorRepository, TxSpecialityRepository,
    TxUserRepository, UserRepository, UserStore,
};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by a transaction closure
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Gives services the read repositories and a way to run a closure
/// atomically. Not mockable directly because of the generic method; mock the
/// repositories instead, or run against SQLite.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn doctors(&self) -> Arc<dyn DoctorRepository>;

    fn appointments(&self) -> Arc<dyn AppointmentRepository>;

    fn specialities(&self) -> Arc<dyn SpecialityRepository>;

    /// Run `f` inside a ReadCommitted transaction.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access within one transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'a> {
        TxUserRepository::new(self.txn)
    }

    pub fn doctors(&self) -> TxDoctorRepository<'a> {
        TxDoctorRepository::new(self.txn)
    }

    pub fn appointments(&self) -> TxAppointmentRepository<'a> {
        TxAppointmentRepository::new(self.txn)
    }

    pub fn specialities(&self) -> TxSpecialityRepository<'a> {
        TxSpecialityRepository::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork over a SeaORM connection pool
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    doctor_repo: Arc<DoctorStore>,
    appointment_repo: Arc<AppointmentStore>,
    speciality_repo: Arc<SpecialityStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            doctor_repo: Arc::new(DoctorStore::new(db.clone())),
            appointment_repo: Arc::new(AppointmentStore::new(db.clone())),
            speciality_repo: Arc::new(SpecialityStore::new(db.clone())),
            db,
        }
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        let txn = match self.db.get_database_backend() {
            // SQLite has no per-transaction isolation settings; it serializes writers.
            DatabaseBackend::Sqlite => self.db.begin().await?,
            _ => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::ReadCommitted),
                        Some(AccessMode::ReadWrite),
                    )
                    .await?
            }
        };
        Ok(txn)
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn doctors(&self) -> Arc<dyn DoctorRepository> {
        self.doctor_repo.clone()
    }

    fn appointments(&self) -> Arc<dyn AppointmentRepository> {
        self.appointment_repo.clone()
    }

    fn specialities(&self) -> Arc<dyn SpecialityRepository> {
        self.speciality_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self.begin().await?;

        let outcome = f(TransactionContext::new(&txn)).await;

        match outcome {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Run a block inside a unit of work.
///
/// ```rust,ignore
/// let appointment = with_transaction!(self.uow, |tx| {
///     tx.appointments().find_for_update(id).await
/// })?;
/// ```
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| {
            Box::pin(async move {
                let result: $crate::errors::AppResult<_> = { $body };
                result
            })
        })
        .await
    };
}
