//! User repository: accounts plus the patient and admin profiles.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::{
    admin, patient,
    user::{self, ActiveModel, Entity as UserEntity},
};
use crate::domain::{Role, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to accounts outside a transaction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Emails are matched case-insensitively; they are stored lowercased.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_by_id(&self.db, id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        find_by_email(&self.db, email).await
    }
}

async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<User>> {
    UserEntity::find_by_id(id)
        .one(conn)
        .await?
        .map(User::try_from)
        .transpose()
}

async fn find_by_email<C: ConnectionTrait>(conn: &C, email: &str) -> AppResult<Option<User>> {
    UserEntity::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(conn)
        .await?
        .map(User::try_from)
        .transpose()
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account writes bound to one transaction.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_by_id(self.txn, id).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        find_by_email(self.txn, email).await
    }

    /// Insert an account. A taken email surfaces as `Conflict`.
    pub async fn create(
        &self,
        name: String,
        email: &str,
        password_hash: String,
        role: Role,
    ) -> AppResult<User> {
        let now = Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            email: Set(normalize_email(email)),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.txn)
        .await
        .map_err(|e| AppError::from_write(e, "Email is already registered"))?;

        User::try_from(model)
    }

    pub async fn create_patient_profile(&self, user_id: Uuid) -> AppResult<()> {
        patient::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            date_of_birth: Set(None),
            gender: Set(None),
            emergency_contact: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(self.txn)
        .await?;
        Ok(())
    }

    pub async fn create_admin_profile(&self, user_id: Uuid) -> AppResult<()> {
        admin::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        }
        .insert(self.txn)
        .await?;
        Ok(())
    }
}
