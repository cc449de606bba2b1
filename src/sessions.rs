use chrono::{NaiveDate, NaiveTime};

use crate::models::{ClassType, Schedule, Session, Term};

/// One row of the "Upcoming Sessions" table.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    pub session_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: Option<u32>,
}

impl SessionRow {
    pub fn date_label(&self) -> String {
        format_date_with_weekday(self.date)
    }

    pub fn time_label(&self) -> String {
        format!(
            "{}–{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Sessions grouped under a heading; session-based classes have no heading.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGroup {
    pub heading: Option<String>,
    pub rows: Vec<SessionRow>,
}

pub fn format_date_with_weekday(date: NaiveDate) -> String {
    date.format("%a, %-d %b %Y").to_string()
}

pub fn term_heading(term: &Term) -> String {
    let capacity = term
        .capacity
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let price = term
        .price
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} from {} to {} of capacity {} at price HKD {}",
        term.name,
        format_date_with_weekday(term.start_date),
        format_date_with_weekday(term.end_date),
        capacity,
        price
    )
}

fn not_past(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

fn schedule_rows(schedule: &Schedule, today: NaiveDate) -> impl Iterator<Item = SessionRow> + '_ {
    schedule
        .sessions
        .iter()
        .filter(move |session| not_past(session.date, today))
        .map(|session| SessionRow {
            session_id: session.id,
            date: session.date,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            capacity: schedule.capacity,
        })
}

/// Session-based classes list every session they carry.
fn class_session_rows(sessions: &[Session]) -> Vec<SessionRow> {
    sessions
        .iter()
        .filter_map(|session| {
            let slot = session.schedule.as_ref()?;
            Some(SessionRow {
                session_id: session.id,
                date: session.date,
                start_time: slot.start_time,
                end_time: slot.end_time,
                capacity: slot.capacity,
            })
        })
        .collect()
}

/// Term-based classes list the sessions still ahead, per running term.
fn term_groups(terms: &[Term], today: NaiveDate) -> Vec<SessionGroup> {
    terms
        .iter()
        .filter(|term| not_past(term.end_date, today))
        .filter_map(|term| {
            let schedules: Vec<&Schedule> = term
                .schedules
                .iter()
                .filter(|schedule| schedule.end_date.is_some_and(|end| not_past(end, today)))
                .collect();
            if schedules.is_empty() {
                return None;
            }
            let rows = schedules
                .into_iter()
                .flat_map(|schedule| schedule_rows(schedule, today))
                .collect();
            Some(SessionGroup {
                heading: Some(term_heading(term)),
                rows,
            })
        })
        .collect()
}

pub fn upcoming_sessions(
    class_type: Option<ClassType>,
    sessions: &[Session],
    terms: &[Term],
    today: NaiveDate,
) -> Vec<SessionGroup> {
    match class_type {
        Some(ClassType::Session) => vec![SessionGroup {
            heading: None,
            rows: class_session_rows(sessions),
        }],
        Some(ClassType::Term) => term_groups(terms, today),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayOfWeek, SessionSlot};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn session(id: i64, on: NaiveDate) -> Session {
        Session {
            id,
            date: on,
            schedule: None,
        }
    }

    fn schedule(end: Option<NaiveDate>, sessions: Vec<Session>) -> Schedule {
        Schedule {
            id: Some(1),
            day_of_week: DayOfWeek::new(1).unwrap(),
            day: Some(date(2025, 12, 1)),
            start_time: time(16),
            end_time: time(17),
            capacity: Some(10),
            end_date: end,
            sessions,
        }
    }

    #[test]
    fn test_row_labels() {
        let row = SessionRow {
            session_id: 1,
            date: date(2025, 12, 15),
            start_time: time(9),
            end_time: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            capacity: Some(4),
        };
        assert_eq!(row.date_label(), "Mon, 15 Dec 2025");
        assert_eq!(row.time_label(), "09:00–10:30");
    }

    #[test]
    fn test_session_class_lists_all_sessions() {
        let slot = SessionSlot {
            start_time: time(9),
            end_time: time(10),
            capacity: Some(6),
        };
        let sessions = vec![
            Session {
                id: 1,
                date: date(2025, 1, 6),
                schedule: Some(slot.clone()),
            },
            Session {
                id: 2,
                date: date(2026, 1, 5),
                schedule: Some(slot),
            },
        ];
        let groups = upcoming_sessions(Some(ClassType::Session), &sessions, &[], date(2025, 12, 15));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].heading, None);
        assert_eq!(groups[0].rows.len(), 2);
    }

    #[test]
    fn test_term_class_filters_past() {
        let today = date(2025, 12, 15);
        let terms = vec![
            Term {
                id: Some(1),
                name: "Autumn".to_string(),
                capacity: Some(10),
                price: Some(1200.0),
                start_date: date(2025, 9, 1),
                end_date: date(2025, 11, 30),
                schedules: vec![schedule(Some(date(2025, 11, 30)), vec![session(1, date(2025, 11, 24))])],
            },
            Term {
                id: Some(2),
                name: "Winter".to_string(),
                capacity: Some(10),
                price: Some(1500.0),
                start_date: date(2025, 12, 1),
                end_date: date(2026, 2, 28),
                schedules: vec![
                    schedule(
                        Some(date(2026, 2, 23)),
                        vec![
                            session(2, date(2025, 12, 8)),
                            session(3, today),
                            session(4, date(2025, 12, 22)),
                        ],
                    ),
                    schedule(Some(date(2025, 12, 8)), vec![session(5, date(2025, 12, 8))]),
                ],
            },
        ];
        let groups = upcoming_sessions(Some(ClassType::Term), &[], &terms, today);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].heading.as_deref(),
            Some("Winter from Mon, 1 Dec 2025 to Sat, 28 Feb 2026 of capacity 10 at price HKD 1500")
        );
        let ids: Vec<_> = groups[0].rows.iter().map(|r| r.session_id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_unselected_type_lists_nothing() {
        assert!(upcoming_sessions(None, &[session(1, date(2026, 1, 1))], &[], date(2025, 12, 15)).is_empty());
    }
}
