//! Migration: specialities, doctor profiles, weekly availability and
//! onboarding applications.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Specialities::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Specialities::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Specialities::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Specialities::Description).text().null())
                    .col(ColumnDef::new(Specialities::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Doctors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Doctors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Doctors::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Doctors::SpecialityId).uuid().not_null())
                    .col(ColumnDef::new(Doctors::Bio).text().null())
                    .col(ColumnDef::new(Doctors::Currency).string_len(8).null())
                    .col(ColumnDef::new(Doctors::ConsultationFee).double().not_null().default(0.0))
                    .col(ColumnDef::new(Doctors::ExperienceYears).integer().not_null().default(0))
                    .col(ColumnDef::new(Doctors::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Doctors::Phone).string_len(32).null())
                    .col(ColumnDef::new(Doctors::Location).string().null())
                    .col(ColumnDef::new(Doctors::LicenceNumber).string_len(64).null())
                    .col(ColumnDef::new(Doctors::JoinedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_doctors_user")
                            .from(Doctors::Table, Doctors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_doctors_speciality")
                            .from(Doctors::Table, Doctors::SpecialityId)
                            .to(Specialities::Table, Specialities::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DoctorAvailability::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DoctorAvailability::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DoctorAvailability::DoctorId).uuid().not_null())
                    .col(ColumnDef::new(DoctorAvailability::DayOfWeek).string_len(16).not_null())
                    .col(ColumnDef::new(DoctorAvailability::StartTime).time().not_null())
                    .col(ColumnDef::new(DoctorAvailability::EndTime).time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_doctor_availability_doctor")
                            .from(DoctorAvailability::Table, DoctorAvailability::DoctorId)
                            .to(Doctors::Table, Doctors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_doctor_availability_doctor_day")
                    .table(DoctorAvailability::Table)
                    .col(DoctorAvailability::DoctorId)
                    .col(DoctorAvailability::DayOfWeek)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DoctorApplications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DoctorApplications::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DoctorApplications::FullName).string().not_null())
                    .col(ColumnDef::new(DoctorApplications::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(DoctorApplications::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(DoctorApplications::Gender).string_len(16).null())
                    .col(ColumnDef::new(DoctorApplications::YearsOfExperience).integer().not_null())
                    .col(ColumnDef::new(DoctorApplications::LicenceNumber).string_len(64).null())
                    .col(ColumnDef::new(DoctorApplications::Bio).text().null())
                    .col(ColumnDef::new(DoctorApplications::Location).string().null())
                    .col(ColumnDef::new(DoctorApplications::SpecialityId).uuid().not_null())
                    .col(ColumnDef::new(DoctorApplications::Status).string_len(16).not_null())
                    .col(ColumnDef::new(DoctorApplications::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_doctor_applications_speciality")
                            .from(DoctorApplications::Table, DoctorApplications::SpecialityId)
                            .to(Specialities::Table, Specialities::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DoctorApplications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DoctorAvailability::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Doctors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Specialities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Specialities {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

#[derive(Iden)]
pub(super) enum Doctors {
    Table,
    Id,
    UserId,
    SpecialityId,
    Bio,
    Currency,
    ConsultationFee,
    ExperienceYears,
    Status,
    Phone,
    Location,
    LicenceNumber,
    JoinedAt,
}

#[derive(Iden)]
enum DoctorAvailability {
    Table,
    Id,
    DoctorId,
    DayOfWeek,
    StartTime,
    EndTime,
}

#[derive(Iden)]
enum DoctorApplications {
    Table,
    Id,
    FullName,
    Email,
    Phone,
    Gender,
    YearsOfExperience,
    LicenceNumber,
    Bio,
    Location,
    SpecialityId,
    Status,
    CreatedAt,
}
