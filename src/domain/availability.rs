//! Weekly availability windows and open-slot enumeration.
//!
//! A doctor publishes recurring `(weekday, start, end)` windows. For a given
//! date the windows are cut into fixed-length slots, and every slot that
//! overlaps an appointment still holding its time is dropped.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::{DATE_FORMAT, TIME_FORMAT};
use crate::errors::{AppError, AppResult};

/// Recurring weekly window in which a doctor accepts appointments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub doctor_id: Uuid,
    #[serde(serialize_with = "serialize_weekday")]
    #[schema(value_type = String, example = "Monday")]
    pub day_of_week: Weekday,
    #[serde(serialize_with = "serialize_time")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "serialize_time")]
    #[schema(value_type = String, example = "17:00")]
    pub end_time: NaiveTime,
}

impl AvailabilityWindow {
    /// A window must start strictly before it ends.
    pub fn check_bounds(start_time: NaiveTime, end_time: NaiveTime) -> AppResult<()> {
        if start_time < end_time {
            Ok(())
        } else {
            Err(AppError::validation("Start time must be before end time"))
        }
    }
}

/// Window as submitted by a doctor; parsed by the practice service.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewAvailabilityWindow {
    #[validate(length(min = 1, message = "Day of week is required"))]
    #[schema(example = "Monday")]
    pub day_of_week: String,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "17:00")]
    pub end_time: String,
}

/// A bookable slot on a specific date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OpenSlot {
    #[serde(serialize_with = "serialize_weekday")]
    #[schema(value_type = String, example = "Monday")]
    pub day_of_week: Weekday,
    #[serde(serialize_with = "serialize_time")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "serialize_time")]
    #[schema(value_type = String, example = "09:30")]
    pub end_time: NaiveTime,
}

/// Open slots of one doctor on one date.
///
/// `has_availability` is false when the doctor has no window on that weekday
/// at all, so "not working" and "fully booked" stay distinguishable.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DaySchedule {
    pub doctor_id: Uuid,
    #[schema(value_type = String, example = "2024-06-10")]
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_weekday")]
    #[schema(value_type = String, example = "Monday")]
    pub day_of_week: Weekday,
    pub slot_duration_minutes: i64,
    pub has_availability: bool,
    pub slots: Vec<OpenSlot>,
}

/// Cut the windows matching `date`'s weekday into `slot_length` slots and drop
/// every slot overlapping `[t, t + slot_length)` for a held time `t`.
///
/// Overlapping windows yield each start once. The result is chronological.
pub fn enumerate_open_slots(
    date: NaiveDate,
    windows: &[AvailabilityWindow],
    held_times: &[NaiveDateTime],
    slot_length: Duration,
) -> Vec<OpenSlot> {
    if slot_length <= Duration::zero() {
        return Vec::new();
    }

    let weekday = date.weekday();
    let mut candidates: BTreeMap<NaiveDateTime, NaiveDateTime> = BTreeMap::new();

    for window in windows.iter().filter(|w| w.day_of_week == weekday) {
        let window_end = date.and_time(window.end_time);
        let mut start = date.and_time(window.start_time);

        while start + slot_length <= window_end {
            candidates.entry(start).or_insert(start + slot_length);
            start += slot_length;
        }
    }

    candidates
        .into_iter()
        .filter(|(start, end)| {
            !held_times
                .iter()
                .any(|held| *held < *end && *start < *held + slot_length)
        })
        .map(|(start, end)| OpenSlot {
            day_of_week: weekday,
            start_time: start.time(),
            end_time: end.time(),
        })
        .collect()
}

/// Full English weekday name, the stored form (`Monday`).
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Accepts full or abbreviated names in any case.
pub fn parse_weekday(value: &str) -> AppResult<Weekday> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| AppError::validation(format!("Invalid day of week '{}'", value)))
}

/// Parse `HH:MM`.
pub fn parse_time(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid time '{}', expected HH:MM", value)))
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        AppError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", value))
    })
}

fn serialize_weekday<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}

fn serialize_time<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(TIME_FORMAT))
}
