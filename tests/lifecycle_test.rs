//! Appointment lifecycle against a real (in-memory SQLite) database.

mod common;

use clinic_booking::domain::appointment::parse_appointment_time;
use clinic_booking::domain::{
    Actor, AppointmentStatus, ConsultationNotes, ConsultationStatus, ConsultationType, DoctorStatus,
    PaymentStatus, ProcessPayment, UpdateDoctorProfile,
};
use clinic_booking::errors::AppError;
use clinic_booking::infra::repositories::NewAppointment;
use clinic_booking::infra::{AppointmentRepository, Persistence, UnitOfWork};
use clinic_booking::services::ServiceContainer;
use clinic_booking::with_transaction;
use uuid::Uuid;

use common::{booking, spawn, TestApp, MONDAY};

fn payment(appointment_id: Uuid) -> ProcessPayment {
    ProcessPayment {
        appointment_id,
        payment_method: "mpesa".into(),
    }
}

#[tokio::test]
async fn test_full_lifecycle() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1500.0).await;
    let patient = app.patient().await;
    let appointments = app.services.appointments();

    let booked = app.book(patient, profile.id, "09:00").await;
    assert_eq!(booked.status, AppointmentStatus::Pending);
    assert_eq!(booked.patient_id, patient.id);

    let approved = appointments.approve(doctor, booked.id).await.unwrap();
    assert_eq!(approved.status, AppointmentStatus::Approved);

    let receipt = app.services.payments().pay(patient, payment(booked.id)).await.unwrap();
    assert_eq!(receipt.appointment.status, AppointmentStatus::Paid);
    assert_eq!(receipt.payment.status, PaymentStatus::Completed);
    assert_eq!(receipt.payment.amount, 1500.0);
    assert!(receipt.payment.transaction_id.starts_with("TXN-"));

    let started = appointments
        .start(doctor, booked.id, ConsultationType::Virtual)
        .await
        .unwrap();
    assert_eq!(started.appointment.status, AppointmentStatus::InProgress);
    assert_eq!(
        started.appointment.consultation_type,
        Some(ConsultationType::Virtual)
    );
    let consultation = started.consultation.unwrap();
    assert_eq!(consultation.status, ConsultationStatus::Ongoing);

    let noted = appointments
        .write_notes(
            doctor,
            consultation.id,
            ConsultationNotes {
                diagnosis: Some("Tension headache".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(noted.diagnosis.as_deref(), Some("Tension headache"));

    let ended = appointments.end(doctor, booked.id).await.unwrap();
    assert_eq!(ended.appointment.status, AppointmentStatus::Completed);
    let closed = ended.consultation.unwrap();
    assert_eq!(closed.status, ConsultationStatus::Completed);
    assert!(closed.end_time.is_some());

    // Notes on a closed consultation are refused
    let late = appointments
        .write_notes(
            doctor,
            closed.id,
            ConsultationNotes {
                notes: Some("Follow up in two weeks".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(late, Err(AppError::InvalidTransition(_))));
}

#[tokio::test]
async fn test_second_booking_of_a_slot_conflicts() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let first = app.patient().await;
    let second = app.patient().await;

    app.book(first, profile.id, "09:00").await;
    let result = app
        .services
        .appointments()
        .book(second, booking(profile.id, "09:00"))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_have_one_winner() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;

    let mut patients = Vec::new();
    for _ in 0..5 {
        patients.push(app.patient().await);
    }

    let tasks: Vec<_> = patients
        .into_iter()
        .map(|patient| {
            let service = app.services.appointments();
            let request = booking(profile.id, "09:30");
            tokio::spawn(async move { service.book(patient, request).await })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    let outcomes: Vec<_> = results.into_iter().map(|joined| joined.unwrap()).collect();

    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    let conflicts = outcomes
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict(_))))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(conflicts, 4);
}

/// Insert straight through the store, without the booking pre-check.
async fn insert_at(
    uow: &Persistence,
    patient: Actor,
    doctor_id: Uuid,
    slot: &str,
) -> Result<clinic_booking::domain::Appointment, AppError> {
    let booking = NewAppointment {
        patient_id: patient.id,
        doctor_id,
        appointment_time: parse_appointment_time(MONDAY, slot).unwrap(),
        reason: "Follow-up".into(),
        consultation_type: None,
    };
    with_transaction!(uow, |tx| tx.appointments().create(booking).await)
}

fn store(app: &TestApp) -> Persistence {
    Persistence::new(app.database.get_connection())
}

#[tokio::test]
async fn test_unique_index_rejects_second_holding_row() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let uow = store(&app);

    let first = insert_at(&uow, app.patient().await, profile.id, "09:00")
        .await
        .unwrap();
    assert_eq!(first.status, AppointmentStatus::Pending);

    let second = insert_at(&uow, app.patient().await, profile.id, "09:00").await;
    match second {
        Err(AppError::Conflict(message)) => {
            assert_eq!(message, "This time slot is already booked")
        }
        other => panic!("expected a conflict, got {:?}", other),
    }

    // The failed insert rolled back; only the first row holds the slot.
    let held = uow
        .appointments()
        .held_times_on(profile.id, first.appointment_time.date())
        .await
        .unwrap();
    assert_eq!(held, vec![first.appointment_time]);
}

#[tokio::test]
async fn test_unique_index_ignores_cancelled_rows() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let uow = store(&app);

    let first = insert_at(&uow, app.patient().await, profile.id, "09:30")
        .await
        .unwrap();
    let first_id = first.id;
    with_transaction!(uow, |tx| {
        tx.appointments()
            .set_status(first_id, AppointmentStatus::Cancelled, None)
            .await
    })
    .unwrap();

    let again = insert_at(&uow, app.patient().await, profile.id, "09:30").await;
    assert!(again.is_ok(), "cancelled row still blocks the slot: {:?}", again.err());

    // Same time with another doctor is never a conflict.
    let (_, other) = app.doctor(admin, 800.0).await;
    assert!(insert_at(&uow, app.patient().await, other.id, "09:30").await.is_ok());
}

#[tokio::test]
async fn test_cancelled_slot_can_be_booked_again() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let patient = app.patient().await;

    let first = app.book(patient, profile.id, "09:00").await;
    app.services.appointments().cancel(patient, first.id).await.unwrap();

    let again = app.book(patient, profile.id, "09:00").await;
    assert_eq!(again.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_cancel_twice_is_rejected() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let patient = app.patient().await;
    let appointments = app.services.appointments();

    let booked = app.book(patient, profile.id, "09:00").await;
    let cancelled = appointments.cancel(patient, booked.id).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let again = appointments.cancel(patient, booked.id).await;
    assert!(matches!(again, Err(AppError::InvalidTransition(_))));

    let listed = appointments.list_for_patient(patient).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_out_of_order_transitions_are_rejected() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1000.0).await;
    let patient = app.patient().await;
    let appointments = app.services.appointments();
    let payments = app.services.payments();

    let booked = app.book(patient, profile.id, "09:00").await;

    // pay on pending
    let paid = payments.pay(patient, payment(booked.id)).await;
    assert!(matches!(paid, Err(AppError::InvalidTransition(_))));

    // start on pending
    let started = appointments
        .start(doctor, booked.id, ConsultationType::Physical)
        .await;
    assert!(matches!(started, Err(AppError::InvalidTransition(_))));

    // end on pending
    let ended = appointments.end(doctor, booked.id).await;
    assert!(matches!(ended, Err(AppError::InvalidTransition(_))));

    // approve on cancelled
    appointments.reject(doctor, booked.id).await.unwrap();
    let approved = appointments.approve(doctor, booked.id).await;
    assert!(matches!(approved, Err(AppError::InvalidTransition(_))));

    // patient cancel after approval
    let other = app.book(patient, profile.id, "09:30").await;
    appointments.approve(doctor, other.id).await.unwrap();
    let cancelled = appointments.cancel(patient, other.id).await;
    assert!(matches!(cancelled, Err(AppError::InvalidTransition(_))));
}

#[tokio::test]
async fn test_other_doctor_is_forbidden() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let (intruder, _) = app.doctor(admin, 800.0).await;
    let patient = app.patient().await;
    let appointments = app.services.appointments();

    let booked = app.book(patient, profile.id, "09:00").await;

    assert!(matches!(
        appointments.approve(intruder, booked.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        appointments.reject(intruder, booked.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        appointments
            .start(intruder, booked.id, ConsultationType::Virtual)
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        appointments.end(intruder, booked.id).await,
        Err(AppError::Forbidden(_))
    ));

    let unchanged = appointments.list_for_patient(patient).await.unwrap();
    assert_eq!(unchanged[0].status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_other_patient_cannot_cancel_or_pay() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1000.0).await;
    let owner = app.patient().await;
    let stranger = app.patient().await;
    let appointments = app.services.appointments();

    let booked = app.book(owner, profile.id, "09:00").await;
    assert!(matches!(
        appointments.cancel(stranger, booked.id).await,
        Err(AppError::Forbidden(_))
    ));

    appointments.approve(doctor, booked.id).await.unwrap();
    assert!(matches!(
        app.services.payments().pay(stranger, payment(booked.id)).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_roles_are_enforced_before_lookup() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1000.0).await;
    let appointments = app.services.appointments();

    // A doctor cannot book, a patient cannot approve
    assert!(matches!(
        appointments.book(doctor, booking(profile.id, "09:00")).await,
        Err(AppError::Forbidden(_))
    ));
    let patient = app.patient().await;
    assert!(matches!(
        appointments.approve(patient, Uuid::new_v4()).await,
        Err(AppError::Forbidden(_))
    ));

    // Unknown appointment for the right role
    assert!(matches!(
        appointments.approve(doctor, Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_booking_validation() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let patient = app.patient().await;
    let appointments = app.services.appointments();

    let mut blank = booking(profile.id, "09:00");
    blank.reason = "   ".into();
    assert!(matches!(
        appointments.book(patient, blank).await,
        Err(AppError::Validation(_))
    ));

    let mut bad_date = booking(profile.id, "09:00");
    bad_date.date = "10/06/2030".into();
    assert!(matches!(
        appointments.book(patient, bad_date).await,
        Err(AppError::Validation(_))
    ));

    assert!(matches!(
        appointments.book(patient, booking(Uuid::new_v4(), "09:00")).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_suspended_doctor_cannot_be_booked() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let patient = app.patient().await;

    app.services
        .onboarding()
        .set_doctor_status(admin, profile.id, DoctorStatus::Suspended)
        .await
        .unwrap();

    let result = app
        .services
        .appointments()
        .book(patient, booking(profile.id, "09:00"))
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_fee_is_read_at_payment_time() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1000.0).await;
    let patient = app.patient().await;

    let booked = app.book(patient, profile.id, "09:00").await;
    app.services.appointments().approve(doctor, booked.id).await.unwrap();

    app.services
        .practice()
        .update_profile(
            doctor,
            UpdateDoctorProfile {
                consultation_fee: Some(2500.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let receipt = app.services.payments().pay(patient, payment(booked.id)).await.unwrap();
    assert_eq!(receipt.payment.amount, 2500.0);

    let again = app.services.payments().pay(patient, payment(booked.id)).await;
    assert!(matches!(again, Err(AppError::InvalidTransition(_))));
}

#[tokio::test]
async fn test_consultation_visibility_and_purge() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1000.0).await;
    let patient = app.patient().await;
    let stranger = app.patient().await;
    let appointments = app.services.appointments();

    let booked = app.book(patient, profile.id, "09:00").await;
    appointments.approve(doctor, booked.id).await.unwrap();
    app.services.payments().pay(patient, payment(booked.id)).await.unwrap();
    let session = appointments
        .start(doctor, booked.id, ConsultationType::Physical)
        .await
        .unwrap();
    let consultation_id = session.consultation.unwrap().id;

    assert!(appointments.consultation(patient, consultation_id).await.is_ok());
    assert!(appointments.consultation(doctor, consultation_id).await.is_ok());
    assert!(appointments.consultation(admin, consultation_id).await.is_ok());
    assert!(matches!(
        appointments.consultation(stranger, consultation_id).await,
        Err(AppError::Forbidden(_))
    ));

    assert!(matches!(
        appointments.purge(doctor, booked.id).await,
        Err(AppError::Forbidden(_))
    ));
    appointments.purge(admin, booked.id).await.unwrap();

    assert!(appointments.list_all(admin).await.unwrap().is_empty());
    assert!(matches!(
        appointments.consultation(admin, consultation_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        appointments.purge(admin, booked.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_doctor_sees_only_own_appointments() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1000.0).await;
    let (other, _) = app.doctor(admin, 1000.0).await;
    let patient = app.patient().await;

    app.book(patient, profile.id, "09:30").await;
    app.book(patient, profile.id, "09:00").await;

    let mine = app.services.appointments().list_for_doctor(doctor).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine[0].appointment_time < mine[1].appointment_time);

    let theirs = app.services.appointments().list_for_doctor(other).await.unwrap();
    assert!(theirs.is_empty());
}

#[tokio::test]
async fn test_payment_is_visible_to_the_parties_only() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1500.0).await;
    let (other_doctor, _) = app.doctor(admin, 700.0).await;
    let patient = app.patient().await;
    let stranger = app.patient().await;
    let payments = app.services.payments();

    let booked = app.book(patient, profile.id, "09:00").await;
    app.services.appointments().approve(doctor, booked.id).await.unwrap();

    let before = payments.payment_for(patient, booked.id).await;
    assert!(matches!(before, Err(AppError::NotFound(_))));

    let receipt = payments.pay(patient, payment(booked.id)).await.unwrap();

    for viewer in [patient, doctor, admin] {
        let seen = payments.payment_for(viewer, booked.id).await.unwrap();
        assert_eq!(seen.id, receipt.payment.id);
        assert_eq!(seen.transaction_id, receipt.payment.transaction_id);
        assert_eq!(seen.amount, 1500.0);
    }

    for outsider in [stranger, other_doctor] {
        let denied = payments.payment_for(outsider, booked.id).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
    }

    let missing = payments.payment_for(admin, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}
