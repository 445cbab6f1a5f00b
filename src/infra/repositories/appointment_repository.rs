//! Appointment repository: appointments together with the consultation and
//! payment rows that hang off them.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::entities::{
    appointment::{self, Entity as AppointmentEntity},
    consultation::{self, Entity as ConsultationEntity},
    payment::{self, Entity as PaymentEntity},
};
use crate::domain::payment::new_transaction_id;
use crate::domain::{
    Appointment, AppointmentStatus, Consultation, ConsultationNotes, ConsultationStatus,
    ConsultationType, Payment, PaymentStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Message used for every double-booking rejection
pub const SLOT_TAKEN: &str = "This time slot is already booked";

/// Read access to appointments outside a transaction.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>>;

    /// Start times of the doctor's appointments on `date` that still hold their slot
    async fn held_times_on(&self, doctor_id: Uuid, date: NaiveDate)
        -> AppResult<Vec<NaiveDateTime>>;

    /// Newest first
    async fn list_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<Appointment>>;

    /// Chronological
    async fn list_for_doctor(&self, doctor_id: Uuid) -> AppResult<Vec<Appointment>>;

    async fn list_all(&self) -> AppResult<Vec<Appointment>>;

    async fn find_consultation(&self, id: Uuid) -> AppResult<Option<Consultation>>;

    async fn find_payment(&self, appointment_id: Uuid) -> AppResult<Option<Payment>>;
}

/// Concrete implementation of AppointmentRepository
pub struct AppointmentStore {
    db: DatabaseConnection,
}

impl AppointmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AppointmentRepository for AppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        decode_one(AppointmentEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn held_times_on(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<NaiveDateTime>> {
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + Duration::days(1);

        Ok(AppointmentEntity::find()
            .filter(appointment::Column::DoctorId.eq(doctor_id))
            .filter(appointment::Column::AppointmentTime.gte(day_start))
            .filter(appointment::Column::AppointmentTime.lt(day_end))
            .filter(appointment::Column::Status.is_in(holding_statuses()))
            .order_by_asc(appointment::Column::AppointmentTime)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|model| model.appointment_time)
            .collect())
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> AppResult<Vec<Appointment>> {
        decode_all(
            AppointmentEntity::find()
                .filter(appointment::Column::PatientId.eq(patient_id))
                .order_by_desc(appointment::Column::AppointmentTime)
                .all(&self.db)
                .await?,
        )
    }

    async fn list_for_doctor(&self, doctor_id: Uuid) -> AppResult<Vec<Appointment>> {
        decode_all(
            AppointmentEntity::find()
                .filter(appointment::Column::DoctorId.eq(doctor_id))
                .order_by_asc(appointment::Column::AppointmentTime)
                .all(&self.db)
                .await?,
        )
    }

    async fn list_all(&self) -> AppResult<Vec<Appointment>> {
        decode_all(
            AppointmentEntity::find()
                .order_by_desc(appointment::Column::AppointmentTime)
                .all(&self.db)
                .await?,
        )
    }

    async fn find_consultation(&self, id: Uuid) -> AppResult<Option<Consultation>> {
        ConsultationEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Consultation::try_from)
            .transpose()
    }

    async fn find_payment(&self, appointment_id: Uuid) -> AppResult<Option<Payment>> {
        find_payment(&self.db, appointment_id).await
    }
}

fn holding_statuses() -> Vec<&'static str> {
    AppointmentStatus::HOLDING.iter().map(|s| s.as_str()).collect()
}

fn decode_one(model: Option<appointment::Model>) -> AppResult<Option<Appointment>> {
    model.map(Appointment::try_from).transpose()
}

fn decode_all(models: Vec<appointment::Model>) -> AppResult<Vec<Appointment>> {
    models.into_iter().map(Appointment::try_from).collect()
}

async fn find_payment<C: ConnectionTrait>(
    conn: &C,
    appointment_id: Uuid,
) -> AppResult<Option<Payment>> {
    PaymentEntity::find()
        .filter(payment::Column::AppointmentId.eq(appointment_id))
        .one(conn)
        .await?
        .map(Payment::try_from)
        .transpose()
}

/// Fields of a new booking
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_time: NaiveDateTime,
    pub reason: String,
    pub consultation_type: Option<ConsultationType>,
}

/// Appointment reads and writes bound to one transaction.
///
/// Reads that precede a status change take a row lock where the backend
/// supports one.
pub struct TxAppointmentRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAppointmentRepository<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    fn locked<E: EntityTrait>(&self, query: Select<E>) -> Select<E> {
        match self.txn.get_database_backend() {
            DatabaseBackend::Postgres => query.lock_exclusive(),
            _ => query,
        }
    }

    /// Load an appointment for a status change.
    pub async fn find_for_update(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        decode_one(
            self.locked(AppointmentEntity::find_by_id(id))
                .one(self.txn)
                .await?,
        )
    }

    /// Appointment still holding `(doctor_id, appointment_time)`, if any.
    pub async fn find_holding(
        &self,
        doctor_id: Uuid,
        appointment_time: NaiveDateTime,
    ) -> AppResult<Option<Appointment>> {
        decode_one(
            AppointmentEntity::find()
                .filter(appointment::Column::DoctorId.eq(doctor_id))
                .filter(appointment::Column::AppointmentTime.eq(appointment_time))
                .filter(appointment::Column::Status.is_in(holding_statuses()))
                .one(self.txn)
                .await?,
        )
    }

    /// Insert a pending appointment. Losing a race for the slot surfaces as
    /// `Conflict` through the partial unique index.
    pub async fn create(&self, booking: NewAppointment) -> AppResult<Appointment> {
        let now = Utc::now();
        let model = appointment::ActiveModel {
            id: Set(Uuid::new_v4()),
            patient_id: Set(booking.patient_id),
            doctor_id: Set(booking.doctor_id),
            appointment_time: Set(booking.appointment_time),
            reason: Set(booking.reason),
            status: Set(AppointmentStatus::Pending.as_str().to_string()),
            consultation_type: Set(booking.consultation_type.map(|t| t.as_str().to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.txn)
        .await
        .map_err(|e| AppError::from_write(e, SLOT_TAKEN))?;

        Appointment::try_from(model)
    }

    /// Write a new status, and the consultation type when one is given.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        consultation_type: Option<ConsultationType>,
    ) -> AppResult<Appointment> {
        let existing = AppointmentEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_not_found("Appointment")?;

        let mut active: appointment::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        if let Some(kind) = consultation_type {
            active.consultation_type = Set(Some(kind.as_str().to_string()));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.txn).await?;
        Appointment::try_from(model)
    }

    pub async fn find_payment(&self, appointment_id: Uuid) -> AppResult<Option<Payment>> {
        find_payment(self.txn, appointment_id).await
    }

    /// Record a settled payment for `appointment`.
    pub async fn create_payment(
        &self,
        appointment: &Appointment,
        amount: f64,
        payment_method: String,
    ) -> AppResult<Payment> {
        let now = Utc::now();
        let model = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            appointment_id: Set(appointment.id),
            doctor_id: Set(appointment.doctor_id),
            patient_id: Set(appointment.patient_id),
            amount: Set(amount),
            payment_method: Set(payment_method),
            status: Set(PaymentStatus::Completed.as_str().to_string()),
            transaction_id: Set(new_transaction_id()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.txn)
        .await
        .map_err(|e| AppError::from_write(e, "Appointment has already been paid for"))?;

        Payment::try_from(model)
    }

    pub async fn find_consultation_for_update(&self, id: Uuid) -> AppResult<Option<Consultation>> {
        self.locked(ConsultationEntity::find_by_id(id))
            .one(self.txn)
            .await?
            .map(Consultation::try_from)
            .transpose()
    }

    pub async fn find_consultation_by_appointment(
        &self,
        appointment_id: Uuid,
    ) -> AppResult<Option<Consultation>> {
        ConsultationEntity::find()
            .filter(consultation::Column::AppointmentId.eq(appointment_id))
            .one(self.txn)
            .await?
            .map(Consultation::try_from)
            .transpose()
    }

    /// Open the consultation of a started appointment.
    pub async fn create_consultation(
        &self,
        appointment: &Appointment,
        consultation_type: ConsultationType,
    ) -> AppResult<Consultation> {
        let now = Utc::now();
        let model = consultation::ActiveModel {
            id: Set(Uuid::new_v4()),
            appointment_id: Set(appointment.id),
            doctor_id: Set(appointment.doctor_id),
            patient_id: Set(appointment.patient_id),
            consultation_type: Set(consultation_type.as_str().to_string()),
            symptoms: Set(None),
            examination: Set(None),
            diagnosis: Set(None),
            prescription: Set(None),
            notes: Set(None),
            status: Set(ConsultationStatus::Ongoing.as_str().to_string()),
            start_time: Set(now),
            end_time: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.txn)
        .await
        .map_err(|e| AppError::from_write(e, "Consultation has already been started"))?;

        Consultation::try_from(model)
    }

    /// Overwrite only the note fields that are present.
    pub async fn update_notes(
        &self,
        id: Uuid,
        notes: ConsultationNotes,
    ) -> AppResult<Consultation> {
        let existing = ConsultationEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_not_found("Consultation")?;

        let mut active: consultation::ActiveModel = existing.into();
        if let Some(symptoms) = notes.symptoms {
            active.symptoms = Set(Some(symptoms));
        }
        if let Some(examination) = notes.examination {
            active.examination = Set(Some(examination));
        }
        if let Some(diagnosis) = notes.diagnosis {
            active.diagnosis = Set(Some(diagnosis));
        }
        if let Some(prescription) = notes.prescription {
            active.prescription = Set(Some(prescription));
        }
        if let Some(text) = notes.notes {
            active.notes = Set(Some(text));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.txn).await?;
        Consultation::try_from(model)
    }

    /// Mark the consultation completed and stamp its end time.
    pub async fn close_consultation(&self, id: Uuid) -> AppResult<Consultation> {
        let existing = ConsultationEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or_not_found("Consultation")?;

        let now = Utc::now();
        let mut active: consultation::ActiveModel = existing.into();
        active.status = Set(ConsultationStatus::Completed.as_str().to_string());
        active.end_time = Set(Some(now));
        active.updated_at = Set(now);

        let model = active.update(self.txn).await?;
        Consultation::try_from(model)
    }

    /// Remove an appointment along with its consultation and payment.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        ConsultationEntity::delete_many()
            .filter(consultation::Column::AppointmentId.eq(id))
            .exec(self.txn)
            .await?;
        PaymentEntity::delete_many()
            .filter(payment::Column::AppointmentId.eq(id))
            .exec(self.txn)
            .await?;

        let result = AppointmentEntity::delete_by_id(id).exec(self.txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Appointment"));
        }
        Ok(())
    }
}
