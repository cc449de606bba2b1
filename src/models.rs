use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Day of week as the provider API counts it: 0 is Sunday, 6 is Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("weekday index {0} is outside 0-6")]
pub struct InvalidWeekday(pub u8);

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

impl DayOfWeek {
    pub fn new(index: u8) -> Result<Self, InvalidWeekday> {
        if index < 7 {
            Ok(Self(index))
        } else {
            Err(InvalidWeekday(index))
        }
    }

    /// The weekday a calendar date actually falls on.
    pub fn of(date: NaiveDate) -> Self {
        Self(date.weekday().num_days_from_sunday() as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        WEEKDAY_NAMES[self.0 as usize]
    }

    /// All seven days in selector order, Sunday first.
    pub fn all() -> impl Iterator<Item = DayOfWeek> {
        (0..7).map(DayOfWeek)
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = InvalidWeekday;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(value: DayOfWeek) -> Self {
        value.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    Session,
    Term,
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassType::Session => f.write_str("session"),
            ClassType::Term => f.write_str("term"),
        }
    }
}

/// Unknown class types coming from the server are treated as "not selected".
fn lenient_class_type<'de, D>(deserializer: D) -> Result<Option<ClassType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        Some("session") => Some(ClassType::Session),
        Some("term") => Some(ClassType::Term),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeUnit {
    Years,
    Months,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialType {
    Free,
    Paid,
}

/// When a recurring schedule stops producing sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScheduleEnd {
    #[default]
    Once,
    Specific {
        #[serde(rename = "endDay")]
        end_day: NaiveDate,
    },
    /// Runs until the enclosing term ends.
    Indefinitely,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSlot {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// A materialized occurrence. Owned by the server; never edited here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub schedule: Option<SessionSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub id: Option<i64>,
    pub day_of_week: DayOfWeek,
    #[serde(default)]
    pub day: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub code: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The class as the server represents it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Class {
    pub id: Option<i64>,
    pub name: String,
    pub chinese_name: String,
    pub description: String,
    pub chinese_description: String,
    pub from_age: Option<u32>,
    pub to_age: Option<u32>,
    pub age_type: Option<AgeUnit>,
    pub language_ids: Vec<i64>,
    pub interest_ids: Vec<i64>,
    #[serde(deserialize_with = "lenient_class_type")]
    pub class_type: Option<ClassType>,
    pub allow_single_session: bool,
    pub single_session_price: Option<f64>,
    pub allow_class_pack: bool,
    pub class_pack_quantity: Option<u32>,
    pub class_pack_price: Option<f64>,
    pub allow_midterm_booking: bool,
    pub allow_trial: bool,
    pub trial_type: Option<TrialType>,
    pub trial_price: Option<f64>,
    pub public: bool,
    pub schedules: Vec<Schedule>,
    pub terms: Vec<Term>,
    pub sessions: Vec<Session>,
    pub discounts: Vec<Discount>,
    pub notes: Vec<Note>,
    pub staff_ids: Vec<i64>,
    pub location_id: Option<i64>,
    pub room_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub name: String,
}

/// Selector options fetched once when the form mounts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub locations: Vec<Location>,
    pub interests: Vec<Interest>,
    pub staff: Vec<StaffMember>,
    pub languages: Vec<Language>,
}

impl ReferenceData {
    pub fn location(&self, id: i64) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }
}

// Outgoing payloads. Each is only ever built by a successful validation.

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub day_of_week: DayOfWeek,
    pub day: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(flatten)]
    pub until: ScheduleEnd,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTerm {
    pub name: String,
    pub capacity: u32,
    pub price: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedules: Vec<NewSchedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ScheduleRequest<'a> {
    pub schedule: &'a NewSchedule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TermRequest<'a> {
    pub term: &'a NewTerm,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct DiscountsRequest<'a> {
    pub discounts: &'a [Discount],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscountsResponse {
    #[serde(default)]
    pub discounts: Vec<Discount>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesPayload {
    pub staff_ids: Vec<i64>,
    pub location_id: i64,
    pub room_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotePayload {
    pub note: String,
}

/// Body of the main class form.
///
/// Schedules, terms, notes and resources are only sent when creating;
/// an existing class changes those through their own endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPayload {
    pub name: String,
    pub chinese_name: String,
    pub description: String,
    pub chinese_description: String,
    pub from_age: Option<u32>,
    pub to_age: Option<u32>,
    pub age_type: Option<AgeUnit>,
    pub language_ids: Vec<i64>,
    pub interest_ids: Vec<i64>,
    pub class_type: ClassType,
    pub allow_single_session: bool,
    pub single_session_price: Option<f64>,
    pub allow_class_pack: bool,
    pub class_pack_quantity: Option<u32>,
    pub class_pack_price: Option<f64>,
    pub allow_midterm_booking: bool,
    pub allow_trial: bool,
    pub trial_type: Option<TrialType>,
    pub trial_price: Option<f64>,
    pub public: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schedules: Vec<NewSchedule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<NewTerm>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<NotePayload>,
    #[serde(flatten)]
    pub resources: Option<ResourcesPayload>,
}
