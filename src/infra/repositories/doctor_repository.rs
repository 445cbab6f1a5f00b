//! Doctor repository: practice profiles, weekly availability windows and
//! onboarding applications.

use async_trait::async_trait;
use chrono::{NaiveTime, Utc, Weekday};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{
    doctor::{self, Entity as DoctorEntity},
    doctor_application::{self, Entity as ApplicationEntity},
    doctor_availability::{self, Entity as AvailabilityEntity},
    user::{self, Entity as UserEntity},
};
use crate::domain::availability::weekday_name;
use crate::domain::{
    ApplicationStatus, AvailabilityWindow, DoctorApplication, DoctorProfile, DoctorStatus,
    NewDoctorApplication, UpdateDoctorProfile,
};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to doctors outside a transaction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn find_profile(&self, id: Uuid) -> AppResult<Option<DoctorProfile>>;

    /// Profile owned by a doctor account
    async fn find_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<DoctorProfile>>;

    /// Active doctors, alphabetical by name
    async fn list_active(&self) -> AppResult<Vec<DoctorProfile>>;

    /// Every window of a doctor, by weekday then start time
    async fn list_windows(&self, doctor_id: Uuid) -> AppResult<Vec<AvailabilityWindow>>;

    /// Windows of a doctor on one weekday
    async fn windows_on(&self, doctor_id: Uuid, day: Weekday)
        -> AppResult<Vec<AvailabilityWindow>>;

    async fn list_pending_applications(&self) -> AppResult<Vec<DoctorApplication>>;
}

/// Concrete implementation of DoctorRepository
pub struct DoctorStore {
    db: DatabaseConnection,
}

impl DoctorStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DoctorRepository for DoctorStore {
    async fn find_profile(&self, id: Uuid) -> AppResult<Option<DoctorProfile>> {
        find_profile(&self.db, id).await
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<DoctorProfile>> {
        find_profile_by_user(&self.db, user_id).await
    }

    async fn list_active(&self) -> AppResult<Vec<DoctorProfile>> {
        let rows = DoctorEntity::find()
            .find_also_related(UserEntity)
            .filter(doctor::Column::Status.eq(DoctorStatus::Active.as_str()))
            .order_by_asc(user::Column::Name)
            .all(&self.db)
            .await?;

        rows.into_iter().map(joined_profile).collect()
    }

    async fn list_windows(&self, doctor_id: Uuid) -> AppResult<Vec<AvailabilityWindow>> {
        let mut windows: Vec<AvailabilityWindow> = AvailabilityEntity::find()
            .filter(doctor_availability::Column::DoctorId.eq(doctor_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(AvailabilityWindow::try_from)
            .collect::<AppResult<_>>()?;

        windows.sort_by_key(|w| (w.day_of_week.num_days_from_monday(), w.start_time));
        Ok(windows)
    }

    async fn windows_on(
        &self,
        doctor_id: Uuid,
        day: Weekday,
    ) -> AppResult<Vec<AvailabilityWindow>> {
        AvailabilityEntity::find()
            .filter(doctor_availability::Column::DoctorId.eq(doctor_id))
            .filter(doctor_availability::Column::DayOfWeek.eq(weekday_name(day)))
            .order_by_asc(doctor_availability::Column::StartTime)
            .all(&self.db)
            .await?
            .into_iter()
            .map(AvailabilityWindow::try_from)
            .collect()
    }

    async fn list_pending_applications(&self) -> AppResult<Vec<DoctorApplication>> {
        ApplicationEntity::find()
            .filter(doctor_application::Column::Status.eq(ApplicationStatus::Pending.as_str()))
            .order_by_asc(doctor_application::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(DoctorApplication::try_from)
            .collect()
    }
}

fn joined_profile(row: (doctor::Model, Option<user::Model>)) -> AppResult<DoctorProfile> {
    let (doctor, user) = row;
    let user = user
        .ok_or_else(|| AppError::internal(format!("Doctor {} has no user account", doctor.id)))?;
    doctor.into_profile(user)
}

async fn find_profile<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<DoctorProfile>> {
    DoctorEntity::find_by_id(id)
        .find_also_related(UserEntity)
        .one(conn)
        .await?
        .map(joined_profile)
        .transpose()
}

async fn find_profile_by_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Option<DoctorProfile>> {
    DoctorEntity::find()
        .find_also_related(UserEntity)
        .filter(doctor::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .map(joined_profile)
        .transpose()
}

/// Doctor writes bound to one transaction.
pub struct TxDoctorRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxDoctorRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub async fn find_profile(&self, id: Uuid) -> AppResult<Option<DoctorProfile>> {
        find_profile(self.txn, id).await
    }

    pub async fn find_profile_by_user(&self, user_id: Uuid) -> AppResult<Option<DoctorProfile>> {
        find_profile_by_user(self.txn, user_id).await
    }

    /// Create the practice profile of a freshly approved doctor: active,
    /// no fee yet.
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        application: &DoctorApplication,
    ) -> AppResult<DoctorProfile> {
        let model = doctor::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            speciality_id: Set(application.speciality_id),
            bio: Set(application.bio.clone()),
            currency: Set(None),
            consultation_fee: Set(0.0),
            experience_years: Set(application.years_of_experience),
            status: Set(DoctorStatus::Active.as_str().to_string()),
            phone: Set(Some(application.phone.clone())),
            location: Set(application.location.clone()),
            licence_number: Set(application.licence_number.clone()),
            joined_at: Set(Utc::now()),
        }
        .insert(self.txn)
        .await
        .map_err(|e| AppError::from_write(e, "Account already has a doctor profile"))?;

        self.find_profile(model.id).await?.ok_or_not_found("Doctor")
    }

    /// Apply the supplied fields only.
    pub async fn update_profile(
        &self,
        id: Uuid,
        changes: UpdateDoctorProfile,
    ) -> AppResult<DoctorProfile> {
        let existing = DoctorEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_not_found("Doctor")?;

        let mut active: doctor::ActiveModel = existing.into();
        if let Some(speciality_id) = changes.speciality_id {
            active.speciality_id = Set(speciality_id);
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(currency) = changes.currency {
            active.currency = Set(Some(currency.to_uppercase()));
        }
        if let Some(fee) = changes.consultation_fee {
            active.consultation_fee = Set(fee);
        }
        if let Some(years) = changes.experience_years {
            active.experience_years = Set(years);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(location) = changes.location {
            active.location = Set(Some(location));
        }
        if let Some(licence_number) = changes.licence_number {
            active.licence_number = Set(Some(licence_number));
        }
        active.update(self.txn).await?;

        self.find_profile(id).await?.ok_or_not_found("Doctor")
    }

    pub async fn set_status(&self, id: Uuid, status: DoctorStatus) -> AppResult<DoctorProfile> {
        let existing = DoctorEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_not_found("Doctor")?;

        let mut active: doctor::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.update(self.txn).await?;

        self.find_profile(id).await?.ok_or_not_found("Doctor")
    }

    pub async fn add_window(
        &self,
        doctor_id: Uuid,
        day: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> AppResult<AvailabilityWindow> {
        let model = doctor_availability::ActiveModel {
            id: Set(Uuid::new_v4()),
            doctor_id: Set(doctor_id),
            day_of_week: Set(weekday_name(day).to_string()),
            start_time: Set(start_time),
            end_time: Set(end_time),
        }
        .insert(self.txn)
        .await?;

        AvailabilityWindow::try_from(model)
    }

    pub async fn find_window(&self, id: Uuid) -> AppResult<Option<AvailabilityWindow>> {
        AvailabilityEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .map(AvailabilityWindow::try_from)
            .transpose()
    }

    pub async fn delete_window(&self, id: Uuid) -> AppResult<()> {
        let result = AvailabilityEntity::delete_by_id(id).exec(self.txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Availability window"));
        }
        Ok(())
    }

    pub async fn find_application(&self, id: Uuid) -> AppResult<Option<DoctorApplication>> {
        ApplicationEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .map(DoctorApplication::try_from)
            .transpose()
    }

    pub async fn find_application_by_email(
        &self,
        email: &str,
    ) -> AppResult<Option<DoctorApplication>> {
        ApplicationEntity::find()
            .filter(doctor_application::Column::Email.eq(email))
            .one(self.txn)
            .await?
            .map(DoctorApplication::try_from)
            .transpose()
    }

    /// Store a new pending application. A reused email surfaces as `Conflict`.
    pub async fn create_application(
        &self,
        form: NewDoctorApplication,
        email: String,
    ) -> AppResult<DoctorApplication> {
        let model = doctor_application::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set(form.full_name.trim().to_string()),
            email: Set(email),
            phone: Set(form.phone),
            gender: Set(form.gender),
            years_of_experience: Set(form.years_of_experience),
            licence_number: Set(form.licence_number),
            bio: Set(form.bio),
            location: Set(form.location),
            speciality_id: Set(form.speciality_id),
            status: Set(ApplicationStatus::Pending.as_str().to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(self.txn)
        .await
        .map_err(|e| AppError::from_write(e, "An application with this email already exists"))?;

        DoctorApplication::try_from(model)
    }

    pub async fn set_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
    ) -> AppResult<DoctorApplication> {
        let existing = ApplicationEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_not_found("Application")?;

        let mut active: doctor_application::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        let model = active.update(self.txn).await?;

        DoctorApplication::try_from(model)
    }
}
