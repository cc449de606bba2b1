use crate::discount::DiscountEditor;
use crate::error::{FormError, ValidationError};
use crate::form::FormMode;
use crate::models::{
    AgeUnit, Class, ClassPayload, ClassType, Note, NotePayload, ReferenceData, Schedule, Session,
    Term, TrialType,
};
use crate::schedule::ScheduleList;
use crate::term::TermList;
use crate::validation::{
    optional_count, required_amount, validate_resources, validate_schedule, validate_term,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resources {
    pub staff_ids: Vec<i64>,
    pub location_id: Option<i64>,
    pub room_id: Option<i64>,
}

impl Resources {
    /// Picks a location; a room from another location is dropped.
    pub fn set_location(&mut self, location_id: Option<i64>) {
        if self.location_id != location_id {
            self.room_id = None;
        }
        self.location_id = location_id;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgeRange {
    pub from: String,
    pub to: String,
    pub unit: Option<AgeUnit>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassPack {
    pub quantity: String,
    pub price: String,
}

/// Pricing and new schedules of a session-based class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPlan {
    /// `Some` when single sessions can be bought.
    pub single_session_price: Option<String>,
    /// `Some` when class packs can be bought.
    pub class_pack: Option<ClassPack>,
    pub schedules: ScheduleList,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermPlan {
    pub allow_midterm_booking: bool,
    pub terms: TermList,
}

/// What kind of class this is, with the fields only that kind has.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ClassPlan {
    #[default]
    Unselected,
    Session(SessionPlan),
    Term(TermPlan),
}

impl ClassPlan {
    pub fn empty(class_type: ClassType) -> Self {
        match class_type {
            ClassType::Session => ClassPlan::Session(SessionPlan::default()),
            ClassType::Term => ClassPlan::Term(TermPlan::default()),
        }
    }

    pub fn class_type(&self) -> Option<ClassType> {
        match self {
            ClassPlan::Unselected => None,
            ClassPlan::Session(_) => Some(ClassType::Session),
            ClassPlan::Term(_) => Some(ClassType::Term),
        }
    }

    /// True while unsaved schedules or terms would be lost by switching.
    pub fn has_entries(&self) -> bool {
        match self {
            ClassPlan::Unselected => false,
            ClassPlan::Session(plan) => !plan.schedules.is_empty(),
            ClassPlan::Term(plan) => !plan.terms.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Trial {
    #[default]
    Off,
    Free,
    Paid {
        price: String,
    },
}

fn amount_text(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn count_text(value: Option<u32>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn plan_of(class: &Class) -> ClassPlan {
    match class.class_type {
        None => ClassPlan::Unselected,
        Some(ClassType::Session) => ClassPlan::Session(SessionPlan {
            single_session_price: class
                .allow_single_session
                .then(|| amount_text(class.single_session_price)),
            class_pack: class.allow_class_pack.then(|| ClassPack {
                quantity: count_text(class.class_pack_quantity),
                price: amount_text(class.class_pack_price),
            }),
            schedules: ScheduleList::new(),
        }),
        Some(ClassType::Term) => ClassPlan::Term(TermPlan {
            allow_midterm_booking: class.allow_midterm_booking,
            terms: TermList::new(),
        }),
    }
}

fn trial_of(class: &Class) -> Trial {
    match (class.allow_trial, class.trial_type) {
        (false, _) => Trial::Off,
        (true, Some(TrialType::Paid)) => Trial::Paid {
            price: amount_text(class.trial_price),
        },
        (true, _) => Trial::Free,
    }
}

/// The single in-memory copy of the class being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDraft {
    pub id: Option<i64>,
    pub name: String,
    pub chinese_name: String,
    pub description: String,
    pub chinese_description: String,
    pub age: AgeRange,
    pub language_ids: Vec<i64>,
    pub interest_ids: Vec<i64>,
    pub public: bool,
    pub resources: Resources,
    pub notes: Vec<Note>,
    /// Note being typed, not yet added.
    pub note: String,
    pub discounts: DiscountEditor,
    plan: ClassPlan,
    trial: Trial,
    schedules: Vec<Schedule>,
    terms: Vec<Term>,
    sessions: Vec<Session>,
}

impl ClassDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_class(class: &Class) -> Self {
        let mut draft = Self::default();
        draft.apply_core(class);
        draft.apply_resources(class);
        draft.apply_notes(class);
        draft.discounts = DiscountEditor::new(&class.discounts);
        draft
    }

    /// Takes the server's copy of everything the main form owns.
    pub fn apply_core(&mut self, class: &Class) {
        self.id = class.id;
        self.name = class.name.clone();
        self.chinese_name = class.chinese_name.clone();
        self.description = class.description.clone();
        self.chinese_description = class.chinese_description.clone();
        self.age = AgeRange {
            from: count_text(class.from_age),
            to: count_text(class.to_age),
            unit: class.age_type,
        };
        self.language_ids = class.language_ids.clone();
        self.interest_ids = class.interest_ids.clone();
        self.public = class.public;

        // Rows typed for a class not created yet stay; pricing comes from the server.
        let mut plan = plan_of(class);
        match (&mut plan, std::mem::take(&mut self.plan)) {
            (ClassPlan::Session(next), ClassPlan::Session(previous)) => {
                next.schedules = previous.schedules;
            }
            (ClassPlan::Term(next), ClassPlan::Term(previous)) => next.terms = previous.terms,
            _ => {}
        }
        self.plan = plan;
        self.trial = trial_of(class);

        self.schedules = class.schedules.clone();
        self.terms = class.terms.clone();
        self.sessions = class.sessions.clone();
    }

    pub fn apply_resources(&mut self, class: &Class) {
        self.resources = Resources {
            staff_ids: class.staff_ids.clone(),
            location_id: class.location_id,
            room_id: class.room_id,
        };
    }

    pub fn apply_notes(&mut self, class: &Class) {
        self.notes = class.notes.clone();
        self.note.clear();
    }

    pub fn plan(&self) -> &ClassPlan {
        &self.plan
    }

    pub fn class_type(&self) -> Option<ClassType> {
        self.plan.class_type()
    }

    pub fn session_plan_mut(&mut self) -> Option<&mut SessionPlan> {
        match &mut self.plan {
            ClassPlan::Session(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn term_plan_mut(&mut self) -> Option<&mut TermPlan> {
        match &mut self.plan {
            ClassPlan::Term(plan) => Some(plan),
            _ => None,
        }
    }

    /// Replaces the plan without any guard; callers check locking first.
    pub(crate) fn switch_plan(&mut self, class_type: ClassType) {
        if self.plan.class_type() == Some(class_type) {
            return;
        }
        self.plan = ClassPlan::empty(class_type);
        if class_type == ClassType::Term {
            self.trial = Trial::Off;
        }
    }

    pub fn trial(&self) -> &Trial {
        &self.trial
    }

    pub fn set_trial(&mut self, trial: Trial) -> Result<(), FormError> {
        if trial != Trial::Off && self.class_type() == Some(ClassType::Term) {
            return Err(FormError::TrialUnavailable);
        }
        self.trial = trial;
        Ok(())
    }

    /// Schedules already saved on the server.
    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Newest note first.
    pub fn prepend_note(&mut self, note: String) {
        self.notes.insert(
            0,
            Note {
                note,
                created_at: None,
            },
        );
    }

    /// Drops every note whose text equals `content`; returns how many went.
    pub fn remove_note(&mut self, content: &str) -> usize {
        let before = self.notes.len();
        self.notes.retain(|note| note.note != content);
        before - self.notes.len()
    }

    /// Builds the main form body, rejecting the first invalid field.
    pub fn to_payload(
        &self,
        mode: FormMode,
        reference: &ReferenceData,
    ) -> Result<ClassPayload, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::ClassNameRequired);
        }
        let class_type = self
            .class_type()
            .ok_or(ValidationError::ClassTypeRequired)?;
        let from_age = optional_count(&self.age.from, "Age from")?;
        let to_age = optional_count(&self.age.to, "Age to")?;
        if let (Some(from), Some(to)) = (from_age, to_age)
            && from > to
        {
            return Err(ValidationError::AgeRangeReversed);
        }

        let mut payload = ClassPayload {
            name: name.to_string(),
            chinese_name: self.chinese_name.trim().to_string(),
            description: self.description.clone(),
            chinese_description: self.chinese_description.clone(),
            from_age,
            to_age,
            age_type: self.age.unit,
            language_ids: self.language_ids.clone(),
            interest_ids: self.interest_ids.clone(),
            class_type,
            allow_single_session: false,
            single_session_price: None,
            allow_class_pack: false,
            class_pack_quantity: None,
            class_pack_price: None,
            allow_midterm_booking: false,
            allow_trial: false,
            trial_type: None,
            trial_price: None,
            public: self.public,
            schedules: Vec::new(),
            terms: Vec::new(),
            notes: Vec::new(),
            resources: None,
        };

        match &self.plan {
            ClassPlan::Unselected => return Err(ValidationError::ClassTypeRequired),
            ClassPlan::Session(plan) => {
                if let Some(price) = &plan.single_session_price {
                    payload.allow_single_session = true;
                    payload.single_session_price =
                        Some(required_amount(price, "Single Session Price")?);
                }
                if let Some(pack) = &plan.class_pack {
                    payload.allow_class_pack = true;
                    payload.class_pack_quantity = Some(
                        optional_count(&pack.quantity, "Class Pack Quantity")?
                            .ok_or(ValidationError::Required("Class Pack Quantity"))?,
                    );
                    payload.class_pack_price = Some(required_amount(&pack.price, "Class Pack Price")?);
                }
                if mode == FormMode::Create {
                    if plan.schedules.is_empty() {
                        return Err(ValidationError::SchedulesRequired);
                    }
                    payload.schedules = plan
                        .schedules
                        .iter()
                        .map(validate_schedule)
                        .collect::<Result<_, _>>()?;
                }
            }
            ClassPlan::Term(plan) => {
                payload.allow_midterm_booking = plan.allow_midterm_booking;
                if mode == FormMode::Create {
                    if plan.terms.is_empty() {
                        return Err(ValidationError::TermsRequired);
                    }
                    payload.terms = plan
                        .terms
                        .iter()
                        .map(validate_term)
                        .collect::<Result<_, _>>()?;
                }
            }
        }

        match &self.trial {
            Trial::Off => {}
            Trial::Free => {
                payload.allow_trial = true;
                payload.trial_type = Some(TrialType::Free);
            }
            Trial::Paid { price } => {
                payload.allow_trial = true;
                payload.trial_type = Some(TrialType::Paid);
                payload.trial_price = Some(required_amount(price, "Trial Class Price")?);
            }
        }

        if mode == FormMode::Create {
            payload.resources = Some(validate_resources(&self.resources, reference)?);
            payload.notes = self
                .notes
                .iter()
                .map(|note| NotePayload {
                    note: note.note.clone(),
                })
                .collect();
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::models::{Discount, Location};

    fn reference() -> ReferenceData {
        ReferenceData {
            locations: vec![Location {
                id: 2,
                name: "Harbour".to_string(),
                rooms: Vec::new(),
            }],
            ..ReferenceData::default()
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 15).unwrap()
    }

    fn session_draft() -> ClassDraft {
        let mut draft = ClassDraft::new();
        draft.name = "Junior Swim".to_string();
        draft.switch_plan(ClassType::Session);
        draft.resources.location_id = Some(2);
        draft.resources.staff_ids = vec![9];
        let plan = draft.session_plan_mut().unwrap();
        let index = plan.schedules.append(monday());
        let row = plan.schedules.get_mut(index).unwrap();
        row.start_time = NaiveTime::from_hms_opt(9, 0, 0);
        row.end_time = NaiveTime::from_hms_opt(10, 0, 0);
        row.capacity = "8".to_string();
        draft
    }

    #[test]
    fn test_from_class_builds_session_plan() {
        let class = Class {
            id: Some(3),
            name: "Art".to_string(),
            class_type: Some(ClassType::Session),
            allow_single_session: true,
            single_session_price: Some(150.0),
            allow_trial: true,
            trial_type: Some(TrialType::Paid),
            trial_price: Some(50.0),
            discounts: vec![Discount {
                id: Some(1),
                code: "EARLY".to_string(),
                percent: 10.0,
            }],
            ..Class::default()
        };
        let draft = ClassDraft::from_class(&class);
        let ClassPlan::Session(plan) = draft.plan() else {
            panic!("expected session plan");
        };
        assert_eq!(plan.single_session_price.as_deref(), Some("150"));
        assert!(plan.class_pack.is_none());
        assert_eq!(
            draft.trial(),
            &Trial::Paid {
                price: "50".to_string()
            }
        );
        assert_eq!(draft.discounts.rows().len(), 1);
    }

    #[test]
    fn test_create_payload_includes_schedules_and_resources() {
        let draft = session_draft();
        let payload = draft.to_payload(FormMode::Create, &reference()).unwrap();
        assert_eq!(payload.schedules.len(), 1);
        assert_eq!(payload.resources.as_ref().unwrap().location_id, 2);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["classType"], "session");
        assert_eq!(value["locationId"], 2);
        assert_eq!(value["schedules"][0]["capacity"], 8);
    }

    #[test]
    fn test_edit_payload_leaves_out_owned_slices() {
        let draft = session_draft();
        let payload = draft.to_payload(FormMode::Edit, &reference()).unwrap();
        assert!(payload.schedules.is_empty());
        assert!(payload.resources.is_none());
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("schedules").is_none());
        assert!(value.get("staffIds").is_none());
    }

    #[test]
    fn test_create_requires_a_schedule() {
        let mut draft = session_draft();
        draft.session_plan_mut().unwrap().schedules.remove(0);
        assert_eq!(
            draft.to_payload(FormMode::Create, &reference()).unwrap_err(),
            ValidationError::SchedulesRequired
        );
    }

    #[test]
    fn test_payload_field_rules() {
        let mut draft = session_draft();
        draft.name = " ".to_string();
        assert_eq!(
            draft.to_payload(FormMode::Edit, &reference()).unwrap_err(),
            ValidationError::ClassNameRequired
        );
        draft.name = "Swim".to_string();
        draft.age.from = "10".to_string();
        draft.age.to = "6".to_string();
        assert_eq!(
            draft.to_payload(FormMode::Edit, &reference()).unwrap_err(),
            ValidationError::AgeRangeReversed
        );
        draft.age.to = "12".to_string();
        draft.session_plan_mut().unwrap().single_session_price = Some(String::new());
        assert_eq!(
            draft
                .to_payload(FormMode::Edit, &reference())
                .unwrap_err()
                .to_string(),
            "Single Session Price is required"
        );
    }

    #[test]
    fn test_apply_core_takes_server_pricing_and_trial() {
        let mut draft = ClassDraft::from_class(&Class {
            id: Some(3),
            class_type: Some(ClassType::Session),
            allow_single_session: true,
            single_session_price: Some(150.0),
            allow_trial: true,
            trial_type: Some(TrialType::Free),
            ..Class::default()
        });
        draft.session_plan_mut().unwrap().single_session_price = Some("175".to_string());

        draft.apply_core(&Class {
            id: Some(3),
            class_type: Some(ClassType::Session),
            allow_single_session: true,
            single_session_price: Some(200.0),
            allow_class_pack: true,
            class_pack_quantity: Some(10),
            class_pack_price: Some(1800.0),
            ..Class::default()
        });

        let ClassPlan::Session(plan) = draft.plan() else {
            panic!("expected session plan");
        };
        assert_eq!(plan.single_session_price.as_deref(), Some("200"));
        assert_eq!(
            plan.class_pack,
            Some(ClassPack {
                quantity: "10".to_string(),
                price: "1800".to_string()
            })
        );
        assert_eq!(draft.trial(), &Trial::Off);
    }

    #[test]
    fn test_apply_core_keeps_rows_of_unsaved_plan() {
        let mut draft = session_draft();
        draft.apply_core(&Class {
            name: "Junior Swim".to_string(),
            class_type: Some(ClassType::Session),
            ..Class::default()
        });
        let ClassPlan::Session(plan) = draft.plan() else {
            panic!("expected session plan");
        };
        assert_eq!(plan.schedules.len(), 1);
    }

    #[test]
    fn test_apply_core_takes_midterm_booking() {
        let mut draft = ClassDraft::from_class(&Class {
            class_type: Some(ClassType::Term),
            ..Class::default()
        });
        draft.term_plan_mut().unwrap().allow_midterm_booking = false;
        draft.apply_core(&Class {
            class_type: Some(ClassType::Term),
            allow_midterm_booking: true,
            ..Class::default()
        });
        assert!(draft.term_plan_mut().unwrap().allow_midterm_booking);
    }

    #[test]
    fn test_term_plan_refuses_trial() {
        let mut draft = ClassDraft::new();
        draft.set_trial(Trial::Free).unwrap();
        draft.switch_plan(ClassType::Term);
        assert_eq!(draft.trial(), &Trial::Off);
        assert!(matches!(
            draft.set_trial(Trial::Free),
            Err(FormError::TrialUnavailable)
        ));
    }

    #[test]
    fn test_notes_prepend_and_remove_by_content() {
        let mut draft = ClassDraft::new();
        draft.prepend_note("first".to_string());
        draft.prepend_note("second".to_string());
        draft.prepend_note("first".to_string());
        assert_eq!(draft.notes[0].note, "first");
        assert_eq!(draft.remove_note("first"), 2);
        assert_eq!(draft.notes.len(), 1);
        assert_eq!(draft.remove_note("missing"), 0);
    }

    #[test]
    fn test_changing_location_drops_room() {
        let mut resources = Resources {
            staff_ids: vec![1],
            location_id: Some(1),
            room_id: Some(5),
        };
        resources.set_location(Some(1));
        assert_eq!(resources.room_id, Some(5));
        resources.set_location(Some(2));
        assert_eq!(resources.room_id, None);
    }
}
