use chrono::NaiveDate;

use crate::discount::DiscountInput;
use crate::draft::Resources;
use crate::error::ValidationError;
use crate::models::{
    DayOfWeek, Discount, NewSchedule, NewTerm, ReferenceData, ResourcesPayload, ScheduleEnd,
};
use crate::schedule::{ScheduleInput, slot_fits};
use crate::term::TermInput;

/// Result of reading a free-text numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Blank,
    Invalid,
    Value(f64),
}

pub(crate) fn parse_number(raw: &str) -> Number {
    let raw = raw.trim();
    if raw.is_empty() {
        return Number::Blank;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Number::Value(value),
        _ => Number::Invalid,
    }
}

/// A non-negative whole number that fits a count field.
pub(crate) fn whole(value: f64) -> Option<u32> {
    (value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64).then_some(value as u32)
}

/// Reads an optional price-like field. Blank means "not set".
pub(crate) fn optional_amount(raw: &str, label: &'static str) -> Result<Option<f64>, ValidationError> {
    match parse_number(raw) {
        Number::Blank => Ok(None),
        Number::Invalid => Err(ValidationError::NotANumber(label)),
        Number::Value(value) => Ok(Some(value)),
    }
}

/// Reads a required price-like field.
pub(crate) fn required_amount(raw: &str, label: &'static str) -> Result<f64, ValidationError> {
    optional_amount(raw, label)?.ok_or(ValidationError::Required(label))
}

/// Reads an optional count field such as an age or a pack quantity.
pub(crate) fn optional_count(raw: &str, label: &'static str) -> Result<Option<u32>, ValidationError> {
    match optional_amount(raw, label)? {
        None => Ok(None),
        Some(value) => whole(value)
            .map(Some)
            .ok_or(ValidationError::NotANumber(label)),
    }
}

/// True when `date` really falls on the declared weekday.
pub fn weekday_matches(date: NaiveDate, day: DayOfWeek) -> bool {
    DayOfWeek::of(date) == day
}

fn check_weekday(
    date: NaiveDate,
    day: DayOfWeek,
    mismatch: ValidationError,
) -> Result<(), ValidationError> {
    if weekday_matches(date, day) {
        Ok(())
    } else {
        Err(mismatch)
    }
}

/// Weekday, time window and end policy checks shared by every kind of schedule.
fn schedule_shape(
    input: &ScheduleInput,
    capacity: Option<u32>,
    mismatch: ValidationError,
) -> Result<NewSchedule, ValidationError> {
    check_weekday(input.date, input.day_of_week, mismatch)?;
    let start_time = input.start_time.ok_or(ValidationError::StartTimeRequired)?;
    let end_time = input.end_time.ok_or(ValidationError::EndTimeRequired)?;
    if !slot_fits(start_time, end_time) {
        return Err(ValidationError::EndTimeTooEarly);
    }
    if let ScheduleEnd::Specific { end_day } = input.until {
        if end_day < input.date {
            return Err(ValidationError::EndDayBeforeStart);
        }
        check_weekday(
            end_day,
            input.day_of_week,
            ValidationError::EndDayWeekdayMismatch,
        )?;
    }
    Ok(NewSchedule {
        capacity,
        day_of_week: input.day_of_week,
        day: input.date,
        start_time,
        end_time,
        until: input.until,
    })
}

/// Validates a stand-alone schedule, as submitted from the add-schedule dialog
/// or as a row of a session-based class being created.
pub fn validate_schedule(input: &ScheduleInput) -> Result<NewSchedule, ValidationError> {
    let capacity = match parse_number(&input.capacity) {
        Number::Blank => return Err(ValidationError::ScheduleCapacityRequired),
        Number::Invalid => return Err(ValidationError::ScheduleCapacityNotNumber),
        Number::Value(value) => whole(value).ok_or(ValidationError::ScheduleCapacityNotNumber)?,
    };
    schedule_shape(input, Some(capacity), ValidationError::ScheduleWeekdayMismatch)
}

/// Validates a schedule nested in a term. Capacity may be left to the term.
pub fn validate_term_schedule(input: &ScheduleInput) -> Result<NewSchedule, ValidationError> {
    let capacity = match parse_number(&input.capacity) {
        Number::Blank => None,
        Number::Invalid => return Err(ValidationError::ScheduleCapacityNotNumber),
        Number::Value(value) => {
            Some(whole(value).ok_or(ValidationError::ScheduleCapacityNotNumber)?)
        }
    };
    schedule_shape(input, capacity, ValidationError::TermWeekdayMismatch)
}

/// Validates the term's own fields, then every nested schedule.
pub fn validate_term(input: &TermInput) -> Result<NewTerm, ValidationError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ValidationError::TermNameRequired);
    }
    let capacity = match parse_number(&input.capacity) {
        Number::Blank => return Err(ValidationError::TermCapacityRequired),
        Number::Invalid => return Err(ValidationError::TermCapacityNotNumber),
        Number::Value(value) => whole(value).ok_or(ValidationError::TermCapacityNotInteger)?,
    };
    let price = match parse_number(&input.price) {
        Number::Blank => return Err(ValidationError::TermPriceRequired),
        Number::Invalid => return Err(ValidationError::TermPriceNotNumber),
        Number::Value(value) => value,
    };
    if input.end_date < input.start_date {
        return Err(ValidationError::TermDatesReversed);
    }
    if input.schedules.is_empty() {
        return Err(ValidationError::TermSchedulesRequired);
    }
    let schedules = crate::term::map_term_schedules(&input.schedules)?;
    Ok(NewTerm {
        name: name.to_string(),
        capacity,
        price,
        start_date: input.start_date,
        end_date: input.end_date,
        schedules,
    })
}

/// Accepts a discount row once it has a code and a positive percentage.
pub fn validate_discount(input: &DiscountInput) -> Result<Discount, ValidationError> {
    let code = input.code.trim();
    if code.is_empty() {
        return Err(ValidationError::DiscountCodeRequired);
    }
    let percent = match parse_number(&input.percent) {
        Number::Blank => return Err(ValidationError::DiscountPercentRequired),
        Number::Invalid => return Err(ValidationError::DiscountPercentNotNumber),
        Number::Value(value) => value,
    };
    if percent <= 0.0 {
        return Err(ValidationError::DiscountPercentNotPositive);
    }
    Ok(Discount {
        id: input.id,
        code: code.to_string(),
        percent,
    })
}

pub fn validate_note(text: &str) -> Result<String, ValidationError> {
    let note = text.trim();
    if note.is_empty() {
        Err(ValidationError::NoteBlank)
    } else {
        Ok(note.to_string())
    }
}

/// Staff, location and room must form a consistent assignment.
pub fn validate_resources(
    resources: &Resources,
    reference: &ReferenceData,
) -> Result<ResourcesPayload, ValidationError> {
    let location_id = resources
        .location_id
        .ok_or(ValidationError::LocationRequired)?;
    if resources.staff_ids.is_empty() {
        return Err(ValidationError::StaffRequired);
    }
    if let Some(room_id) = resources.room_id {
        let in_location = reference
            .location(location_id)
            .is_some_and(|location| location.rooms.iter().any(|room| room.id == room_id));
        if !in_location {
            return Err(ValidationError::RoomNotInLocation);
        }
    }
    Ok(ResourcesPayload {
        staff_ids: resources.staff_ids.clone(),
        location_id,
        room_id: resources.room_id,
    })
}
