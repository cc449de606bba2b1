use chrono::{Duration, NaiveDate, NaiveTime};

use crate::models::{DayOfWeek, ScheduleEnd};

/// Shortest bookable slot, and the step of the time pickers.
pub const TIME_STEP_MINUTES: i64 = 15;

/// A schedule row as the user edits it. Capacity stays raw text until validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleInput {
    pub day_of_week: DayOfWeek,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub capacity: String,
    pub until: ScheduleEnd,
}

impl ScheduleInput {
    /// A blank row anchored on `today`.
    pub fn starting(today: NaiveDate) -> Self {
        Self {
            day_of_week: DayOfWeek::of(today),
            date: today,
            start_time: None,
            end_time: None,
            capacity: String::new(),
            until: ScheduleEnd::Once,
        }
    }

    /// Picks a weekday and moves the anchor date forward onto it when they disagree.
    pub fn set_day_of_week(&mut self, day: DayOfWeek) {
        self.day_of_week = day;
        if DayOfWeek::of(self.date) != day {
            self.date = next_on_or_after(self.date, day);
        }
    }

    pub fn set_start_time(&mut self, start: NaiveTime) {
        self.start_time = Some(start);
        if let Some(end) = self.end_time
            && !slot_fits(start, end)
        {
            self.end_time = None;
        }
    }

    pub fn end_time_options(&self) -> Vec<NaiveTime> {
        self.start_time.map(end_time_options).unwrap_or_default()
    }
}

/// First date on or after `from` that falls on `day`.
pub fn next_on_or_after(from: NaiveDate, day: DayOfWeek) -> NaiveDate {
    let current = DayOfWeek::of(from).index() as i64;
    let wanted = day.index() as i64;
    from + Duration::days((wanted - current).rem_euclid(7))
}

/// Length of the slot from `start` to `end`, wrapping past midnight.
pub fn slot_length(start: NaiveTime, end: NaiveTime) -> Duration {
    let diff = end - start;
    if diff <= Duration::zero() {
        diff + Duration::days(1)
    } else {
        diff
    }
}

/// An end time is valid from `start + 15min` up to a full day after `start`.
pub fn slot_fits(start: NaiveTime, end: NaiveTime) -> bool {
    let length = slot_length(start, end);
    length >= Duration::minutes(TIME_STEP_MINUTES) && length <= Duration::days(1)
}

/// Earliest and latest selectable end time for a given start. The latest is
/// the start's own clock time on the following day.
pub fn end_time_bounds(start: NaiveTime) -> (NaiveTime, NaiveTime) {
    let (earliest, _) = start.overflowing_add_signed(Duration::minutes(TIME_STEP_MINUTES));
    (earliest, start)
}

/// Every end time a picker should offer, in 15 minute steps.
pub fn end_time_options(start: NaiveTime) -> Vec<NaiveTime> {
    let steps = Duration::days(1).num_minutes() / TIME_STEP_MINUTES;
    (1..=steps)
        .map(|step| {
            start
                .overflowing_add_signed(Duration::minutes(step * TIME_STEP_MINUTES))
                .0
        })
        .collect()
}

/// The recurring schedules of a session-based class being created.
///
/// Storage order is insertion order; [`ScheduleList::display_order`] gives
/// the order rows are shown in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleList {
    entries: Vec<ScheduleInput>,
}

impl ScheduleList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row for `today`, carrying over the last row's times.
    pub fn append(&mut self, today: NaiveDate) -> usize {
        let mut entry = ScheduleInput::starting(today);
        if let Some(previous) = self.entries.last() {
            entry.start_time = previous.start_time;
            entry.end_time = previous.end_time;
        }
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<ScheduleInput> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&ScheduleInput> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ScheduleInput> {
        self.entries.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleInput> {
        self.entries.iter()
    }

    /// Rows with their storage index, latest weekday first.
    pub fn display_order(&self) -> Vec<(usize, &ScheduleInput)> {
        let mut rows: Vec<_> = self.entries.iter().enumerate().collect();
        rows.sort_by(|(_, a), (_, b)| b.day_of_week.cmp(&a.day_of_week));
        rows
    }

    /// "Add Schedule" for the first row, "Add Another Schedule" afterwards.
    pub fn add_label(&self) -> &'static str {
        if self.entries.is_empty() {
            "Add Schedule"
        } else {
            "Add Another Schedule"
        }
    }
}

impl From<Vec<ScheduleInput>> for ScheduleList {
    fn from(entries: Vec<ScheduleInput>) -> Self {
        Self { entries }
    }
}
