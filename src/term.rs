use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::models::{NewSchedule, ScheduleEnd};
use crate::schedule::ScheduleInput;
use crate::validation::validate_term_schedule;

/// A term as the user edits it in the add-term dialog or the create form.
#[derive(Debug, Clone, PartialEq)]
pub struct TermInput {
    pub name: String,
    pub capacity: String,
    pub price: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedules: Vec<ScheduleInput>,
}

impl TermInput {
    /// A blank term for `today` with one schedule that runs until the term ends.
    pub fn starting(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            capacity: String::new(),
            price: String::new(),
            start_date: today,
            end_date: today,
            schedules: vec![term_schedule(today)],
        }
    }

    pub fn add_schedule(&mut self, today: NaiveDate) -> usize {
        let mut entry = term_schedule(today);
        if let Some(previous) = self.schedules.last() {
            entry.start_time = previous.start_time;
            entry.end_time = previous.end_time;
        }
        self.schedules.push(entry);
        self.schedules.len() - 1
    }

    pub fn remove_schedule(&mut self, index: usize) -> Option<ScheduleInput> {
        (index < self.schedules.len()).then(|| self.schedules.remove(index))
    }
}

fn term_schedule(today: NaiveDate) -> ScheduleInput {
    ScheduleInput {
        until: ScheduleEnd::Indefinitely,
        ..ScheduleInput::starting(today)
    }
}

/// Checks every nested schedule of a term and reshapes it for sending.
///
/// The whole mapping fails on the first schedule whose date does not fall on
/// its declared weekday, so a term is never sent with a partial schedule list.
pub fn map_term_schedules(schedules: &[ScheduleInput]) -> Result<Vec<NewSchedule>, ValidationError> {
    schedules.iter().map(validate_term_schedule).collect()
}

/// Terms of a term-based class being created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermList {
    terms: Vec<TermInput>,
}

impl TermList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, today: NaiveDate) -> usize {
        self.terms.push(TermInput::starting(today));
        self.terms.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<TermInput> {
        (index < self.terms.len()).then(|| self.terms.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&TermInput> {
        self.terms.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TermInput> {
        self.terms.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TermInput> {
        self.terms.iter()
    }
}
