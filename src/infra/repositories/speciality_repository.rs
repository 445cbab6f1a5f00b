//! Speciality catalog repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::speciality::{self, Entity as SpecialityEntity};
use crate::domain::Speciality;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SpecialityRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Speciality>>;

    /// Whole catalog, alphabetical
    async fn list(&self) -> AppResult<Vec<Speciality>>;
}

/// Concrete implementation of SpecialityRepository
pub struct SpecialityStore {
    db: DatabaseConnection,
}

impl SpecialityStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SpecialityRepository for SpecialityStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Speciality>> {
        Ok(SpecialityEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Speciality::from))
    }

    async fn list(&self) -> AppResult<Vec<Speciality>> {
        Ok(SpecialityEntity::find()
            .order_by_asc(speciality::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Speciality::from)
            .collect())
    }
}

/// Catalog access bound to one transaction.
pub struct TxSpecialityRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxSpecialityRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(SpecialityEntity::find_by_id(id).one(self.txn).await?.is_some())
    }

    /// Insert a speciality. A duplicate name surfaces as `Conflict`.
    pub async fn create(&self, name: String, description: Option<String>) -> AppResult<Speciality> {
        let model = speciality::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(description),
            created_at: Set(Utc::now()),
        }
        .insert(self.txn)
        .await
        .map_err(|e| AppError::from_write(e, "Speciality already exists"))?;

        Ok(Speciality::from(model))
    }
}
