//! Slot resolution and practice self-service against SQLite.

mod common;

use chrono::{NaiveDate, NaiveTime};

use clinic_booking::domain::{AppointmentStatus, NewAvailabilityWindow};
use clinic_booking::errors::AppError;
use clinic_booking::services::ServiceContainer;

use common::{spawn, MONDAY};

fn monday() -> NaiveDate {
    NaiveDate::parse_from_str(MONDAY, "%Y-%m-%d").unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn test_monday_window_yields_two_half_hour_slots() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;

    let schedule = app
        .services
        .availability()
        .open_slots(profile.id, monday(), Some(30))
        .await
        .unwrap();

    assert!(schedule.has_availability);
    let slots: Vec<_> = schedule
        .slots
        .iter()
        .map(|s| (s.start_time, s.end_time))
        .collect();
    assert_eq!(slots, vec![(at(9, 0), at(9, 30)), (at(9, 30), at(10, 0))]);
}

#[tokio::test]
async fn test_booked_slot_disappears_until_cancelled() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let patient = app.patient().await;
    let availability = app.services.availability();

    let booked = app.book(patient, profile.id, "09:00").await;

    let schedule = availability
        .open_slots(profile.id, monday(), Some(30))
        .await
        .unwrap();
    let starts: Vec<_> = schedule.slots.iter().map(|s| s.start_time).collect();
    assert_eq!(starts, vec![at(9, 30)]);

    let booked_times = availability.booked_times(profile.id, monday()).await.unwrap();
    assert_eq!(booked_times, vec!["09:00".to_string()]);

    let cancelled = app
        .services
        .appointments()
        .cancel(patient, booked.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let schedule = availability
        .open_slots(profile.id, monday(), Some(30))
        .await
        .unwrap();
    assert_eq!(schedule.slots.len(), 2);
}

#[tokio::test]
async fn test_default_duration_comes_from_config() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;

    let schedule = app
        .services
        .availability()
        .open_slots(profile.id, monday(), None)
        .await
        .unwrap();

    assert_eq!(
        schedule.slot_duration_minutes,
        app.config.slot_duration_minutes
    );
}

#[tokio::test]
async fn test_day_without_windows_reports_no_availability() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let tuesday = monday().succ_opt().unwrap();

    let schedule = app
        .services
        .availability()
        .open_slots(profile.id, tuesday, Some(30))
        .await
        .unwrap();

    assert!(!schedule.has_availability);
    assert!(schedule.slots.is_empty());
}

#[tokio::test]
async fn test_overlapping_windows_do_not_duplicate_slots() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1000.0).await;

    app.services
        .practice()
        .add_window(
            doctor,
            NewAvailabilityWindow {
                day_of_week: "monday".into(),
                start_time: "09:30".into(),
                end_time: "10:30".into(),
            },
        )
        .await
        .unwrap();

    let schedule = app
        .services
        .availability()
        .open_slots(profile.id, monday(), Some(30))
        .await
        .unwrap();
    let starts: Vec<_> = schedule.slots.iter().map(|s| s.start_time).collect();

    assert_eq!(starts, vec![at(9, 0), at(9, 30), at(10, 0)]);
}

#[tokio::test]
async fn test_invalid_duration_and_unknown_doctor() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let availability = app.services.availability();

    assert!(matches!(
        availability.open_slots(profile.id, monday(), Some(0)).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        availability
            .open_slots(uuid::Uuid::new_v4(), monday(), Some(30))
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_window_management_is_owner_only() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1000.0).await;
    let (other, _) = app.doctor(admin, 1000.0).await;
    let practice = app.services.practice();

    let windows = practice.list_windows(profile.id).await.unwrap();
    assert_eq!(windows.len(), 1);
    let window_id = windows[0].id;

    assert!(matches!(
        practice.remove_window(other, window_id).await,
        Err(AppError::Forbidden(_))
    ));

    practice.remove_window(doctor, window_id).await.unwrap();
    assert!(practice.my_windows(doctor).await.unwrap().is_empty());

    assert!(matches!(
        practice.remove_window(doctor, window_id).await,
        Err(AppError::NotFound(_))
    ));
}
