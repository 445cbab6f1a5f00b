//! Migration: appointments with their consultation and payment rows.
//!
//! The partial unique index is what closes the double-booking race: two
//! holding appointments can never share `(doctor_id, appointment_time)`.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts_tables::Users;
use super::m20240101_000002_create_practice_tables::Doctors;

const HELD_SLOT_INDEX: &str = "idx_appointments_doctor_slot_held";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Appointments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Appointments::PatientId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::DoctorId).uuid().not_null())
                    .col(ColumnDef::new(Appointments::AppointmentTime).date_time().not_null())
                    .col(ColumnDef::new(Appointments::Reason).string_len(255).not_null())
                    .col(ColumnDef::new(Appointments::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Appointments::ConsultationType).string_len(16).null())
                    .col(ColumnDef::new(Appointments::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Appointments::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_patient")
                            .from(Appointments::Table, Appointments::PatientId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_doctor")
                            .from(Appointments::Table, Appointments::DoctorId)
                            .to(Doctors::Table, Doctors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Partial indexes are not expressible through the index builder.
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON appointments (doctor_id, appointment_time) \
                 WHERE status IN ('pending', 'approved', 'paid', 'in_progress')",
                HELD_SLOT_INDEX
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_patient")
                    .table(Appointments::Table)
                    .col(Appointments::PatientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Consultations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Consultations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Consultations::AppointmentId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Consultations::DoctorId).uuid().not_null())
                    .col(ColumnDef::new(Consultations::PatientId).uuid().not_null())
                    .col(ColumnDef::new(Consultations::ConsultationType).string_len(16).not_null())
                    .col(ColumnDef::new(Consultations::Symptoms).text().null())
                    .col(ColumnDef::new(Consultations::Examination).text().null())
                    .col(ColumnDef::new(Consultations::Diagnosis).text().null())
                    .col(ColumnDef::new(Consultations::Prescription).text().null())
                    .col(ColumnDef::new(Consultations::Notes).text().null())
                    .col(ColumnDef::new(Consultations::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Consultations::StartTime).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Consultations::EndTime).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Consultations::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Consultations::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_consultations_appointment")
                            .from(Consultations::Table, Consultations::AppointmentId)
                            .to(Appointments::Table, Appointments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payments::AppointmentId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Payments::DoctorId).uuid().not_null())
                    .col(ColumnDef::new(Payments::PatientId).uuid().not_null())
                    .col(ColumnDef::new(Payments::Amount).double().not_null())
                    .col(ColumnDef::new(Payments::PaymentMethod).string_len(50).not_null())
                    .col(ColumnDef::new(Payments::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Payments::TransactionId).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Payments::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_appointment")
                            .from(Payments::Table, Payments::AppointmentId)
                            .to(Appointments::Table, Appointments::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Consultations::Table).to_owned())
            .await?;
        manager
            .get_connection()
            .execute_unprepared(&format!("DROP INDEX IF EXISTS {}", HELD_SLOT_INDEX))
            .await?;
        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Appointments {
    Table,
    Id,
    PatientId,
    DoctorId,
    AppointmentTime,
    Reason,
    Status,
    ConsultationType,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Consultations {
    Table,
    Id,
    AppointmentId,
    DoctorId,
    PatientId,
    ConsultationType,
    Symptoms,
    Examination,
    Diagnosis,
    Prescription,
    Notes,
    Status,
    StartTime,
    EndTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    AppointmentId,
    DoctorId,
    PatientId,
    Amount,
    PaymentMethod,
    Status,
    TransactionId,
    CreatedAt,
    UpdatedAt,
}
