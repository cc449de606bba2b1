//! The class form controller.
//!
//! [`ClassForm`] owns the draft and the dialog state, and runs every
//! submission the page offers: the main form, the add-schedule and add-term
//! dialogs, the discount list, resources and notes. Each submission handles
//! its own failures: it logs them, shows them through the [`Notifier`] and
//! leaves the draft as it was so the user can correct and resubmit.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

use crate::client::ProviderClient;
use crate::discount::DiscountEditor;
use crate::draft::ClassDraft;
use crate::error::FormError;
use crate::models::{Class, ClassType, Interest, NotePayload, ReferenceData, Room};
use crate::notify::{Navigator, NoticeLevel, Notifier, Route};
use crate::schedule::ScheduleInput;
use crate::sessions::{SessionGroup, upcoming_sessions};
use crate::settings::{DEFAULT_TIMEZONE, Settings};
use crate::term::TermInput;
use crate::validation::{validate_note, validate_resources, validate_schedule, validate_term};

pub const SESSION_HELPER: &str = "This allows you to offer parents the option of purchasing \
individual sessions or groups of sessions. This is useful for one-on-one classes or for \
offering volume discounts.";

pub const TERM_HELPER: &str = "Terms allow you to group sessions by date. This is useful for \
activities like team sports, which are always available but have distinct seasons.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// What a class-type section of the page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The type is not selected; explain what it would offer.
    Helper(&'static str),
    Editor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Closed,
    /// "Available Tags"
    Interests,
    AddSchedule(ScheduleInput),
    AddTerm(TermInput),
}

pub struct ClassForm {
    client: ProviderClient,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    timezone: Tz,
    mode: FormMode,
    reference: Option<ReferenceData>,
    draft: ClassDraft,
    dialog: Dialog,
}

impl ClassForm {
    pub fn new(
        client: ProviderClient,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        mode: FormMode,
        draft: ClassDraft,
    ) -> Self {
        Self {
            client,
            notifier,
            navigator,
            timezone: DEFAULT_TIMEZONE,
            mode,
            reference: None,
            draft,
            dialog: Dialog::Closed,
        }
    }

    /// Form for a new class.
    pub fn create(
        settings: &Settings,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, config::ConfigError> {
        Ok(Self::new(
            ProviderClient::from_settings(settings),
            notifier,
            navigator,
            FormMode::Create,
            ClassDraft::new(),
        )
        .with_timezone(settings.tz()?))
    }

    /// Form for a class the server already has.
    pub fn edit(
        settings: &Settings,
        class: &Class,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, config::ConfigError> {
        Ok(Self::new(
            ProviderClient::from_settings(settings),
            notifier,
            navigator,
            FormMode::Edit,
            ClassDraft::from_class(class),
        )
        .with_timezone(settings.tz()?))
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    pub fn draft(&self) -> &ClassDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ClassDraft {
        &mut self.draft
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut Dialog {
        &mut self.dialog
    }

    pub fn is_loaded(&self) -> bool {
        self.reference.is_some()
    }

    pub fn reference_data(&self) -> Option<&ReferenceData> {
        self.reference.as_ref()
    }

    /// Logs a failure, shows it to the user and hands it back.
    fn fail(&self, err: FormError) -> FormError {
        if err.is_validation() {
            warn!(error = %err, "class form input rejected");
        } else {
            error!(error = %err, "class form request failed");
        }
        self.notifier.notify(NoticeLevel::Error, &err.to_string());
        err
    }

    fn require_loaded(&self) -> Result<&ReferenceData, FormError> {
        self.reference.as_ref().ok_or(FormError::NotLoaded)
    }

    fn require_create(&self) -> Result<(), FormError> {
        match self.mode {
            FormMode::Create => Ok(()),
            FormMode::Edit => Err(FormError::CreateModeOnly),
        }
    }

    fn require_edit(&self) -> Result<i64, FormError> {
        if self.mode != FormMode::Edit {
            return Err(FormError::EditModeOnly);
        }
        self.draft.id.ok_or(FormError::MissingClassId)
    }

    /// Fetches locations, interests, staff and languages together.
    ///
    /// On failure the form stays unloaded and every other action keeps
    /// refusing with [`FormError::NotLoaded`]; there is no retry.
    pub async fn load(&mut self) -> Result<(), FormError> {
        match self.client.fetch_reference_data().await {
            Ok(reference) => {
                info!(
                    locations = reference.locations.len(),
                    staff = reference.staff.len(),
                    "class form reference data loaded"
                );
                self.reference = Some(reference);
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    // Class type

    pub fn section(&self, class_type: ClassType) -> Section {
        if self.draft.class_type() == Some(class_type) {
            Section::Editor
        } else {
            match class_type {
                ClassType::Session => Section::Helper(SESSION_HELPER),
                ClassType::Term => Section::Helper(TERM_HELPER),
            }
        }
    }

    /// Whether the option for `class_type` is read-only.
    ///
    /// An existing class keeps its type. A new class can only switch once
    /// the schedules or terms entered for the current type are removed.
    pub fn is_class_type_locked(&self, class_type: ClassType) -> bool {
        let current = self.draft.class_type();
        if current == Some(class_type) {
            return false;
        }
        match self.mode {
            FormMode::Edit => current.is_some(),
            FormMode::Create => self.draft.plan().has_entries(),
        }
    }

    pub fn select_class_type(&mut self, class_type: ClassType) -> Result<(), FormError> {
        if self.is_class_type_locked(class_type) {
            return Err(self.fail(FormError::ClassTypeLocked(class_type)));
        }
        self.draft.switch_plan(class_type);
        Ok(())
    }

    // Schedule rows of a new session-based class

    pub fn add_schedule_row(&mut self) -> Result<usize, FormError> {
        self.require_create().map_err(|err| self.fail(err))?;
        let today = self.today();
        match self.draft.session_plan_mut() {
            Some(plan) => Ok(plan.schedules.append(today)),
            None => Err(self.fail(FormError::ClassTypeNotSelected)),
        }
    }

    pub fn remove_schedule_row(&mut self, index: usize) -> Result<ScheduleInput, FormError> {
        let removed = match self.draft.session_plan_mut() {
            Some(plan) => plan
                .schedules
                .remove(index)
                .ok_or(FormError::IndexOutOfRange(index)),
            None => Err(FormError::ClassTypeNotSelected),
        };
        removed.map_err(|err| self.fail(err))
    }

    // Terms of a new term-based class

    pub fn add_term_row(&mut self) -> Result<usize, FormError> {
        self.require_create().map_err(|err| self.fail(err))?;
        let today = self.today();
        match self.draft.term_plan_mut() {
            Some(plan) => Ok(plan.terms.append(today)),
            None => Err(self.fail(FormError::ClassTypeNotSelected)),
        }
    }

    pub fn remove_term_row(&mut self, index: usize) -> Result<TermInput, FormError> {
        let removed = match self.draft.term_plan_mut() {
            Some(plan) => plan.terms.remove(index).ok_or(FormError::IndexOutOfRange(index)),
            None => Err(FormError::ClassTypeNotSelected),
        };
        removed.map_err(|err| self.fail(err))
    }

    // Dialogs

    pub fn open_interests(&mut self) -> Result<&[Interest], FormError> {
        if self.reference.is_none() {
            return Err(self.fail(FormError::NotLoaded));
        }
        self.dialog = Dialog::Interests;
        Ok(self
            .reference
            .as_ref()
            .map(|reference| reference.interests.as_slice())
            .unwrap_or_default())
    }

    /// Opens "Add Session" or "Add Term" for a saved class, depending on its type.
    pub fn open_add_dialog(&mut self) -> Result<(), FormError> {
        self.require_loaded().map_err(|err| self.fail(err))?;
        self.require_edit().map_err(|err| self.fail(err))?;
        let Some(class_type) = self.draft.class_type() else {
            return Err(self.fail(FormError::ClassTypeNotSelected));
        };
        if self.draft.resources.location_id.is_none() {
            let what = match class_type {
                ClassType::Session => "sessions",
                ClassType::Term => "terms",
            };
            let err = FormError::LocationRequired(what);
            info!(error = %err, "add dialog refused");
            self.notifier.notify(NoticeLevel::Info, &err.to_string());
            return Err(err);
        }
        let today = self.today();
        self.dialog = match class_type {
            ClassType::Session => Dialog::AddSchedule(ScheduleInput::starting(today)),
            ClassType::Term => Dialog::AddTerm(TermInput::starting(today)),
        };
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::Closed;
    }

    /// Replaces the draft with the server's copy after a schedule or term was added.
    fn accept_added(&mut self, class: Class, message: &str) {
        self.dialog = Dialog::Closed;
        self.draft = ClassDraft::from_class(&class);
        self.notifier.notify(NoticeLevel::Success, message);
        self.navigator.reload();
    }

    /// Sends the add-schedule dialog. A date that does not fall on the chosen
    /// weekday is rejected before any request is made.
    pub async fn submit_schedule(&mut self) -> Result<(), FormError> {
        let class_id = self.require_edit().map_err(|err| self.fail(err))?;
        let Dialog::AddSchedule(input) = &self.dialog else {
            return Err(self.fail(FormError::DialogNotOpen));
        };
        let schedule = validate_schedule(input).map_err(|err| self.fail(err.into()))?;

        match self.client.create_schedule(class_id, &schedule).await {
            Ok(class) => {
                info!(class_id, day = %schedule.day_of_week, "schedule added");
                self.accept_added(class, "Schedule added");
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Sends the add-term dialog after every nested schedule passed validation.
    pub async fn submit_term(&mut self) -> Result<(), FormError> {
        let class_id = self.require_edit().map_err(|err| self.fail(err))?;
        let Dialog::AddTerm(input) = &self.dialog else {
            return Err(self.fail(FormError::DialogNotOpen));
        };
        let term = validate_term(input).map_err(|err| self.fail(err.into()))?;

        match self.client.create_term(class_id, &term).await {
            Ok(class) => {
                info!(class_id, term = %term.name, schedules = term.schedules.len(), "term added");
                self.accept_added(class, "Term added");
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    // Discounts

    /// Accepts the open discount row, or reports why it cannot be accepted.
    pub fn accept_discount(&mut self) -> Result<(), FormError> {
        match self.draft.discounts.accept() {
            Some(Ok(_)) => Ok(()),
            Some(Err(err)) => Err(self.fail(err.into())),
            None => Ok(()),
        }
    }

    /// Replaces the class's discounts with the list on screen.
    pub async fn save_discounts(&mut self) -> Result<(), FormError> {
        let class_id = self.require_edit().map_err(|err| self.fail(err))?;
        let discounts = match self.draft.discounts.discounts() {
            Some(Ok(discounts)) => discounts,
            Some(Err(err)) => return Err(self.fail(err.into())),
            None => return Err(self.fail(FormError::DiscountRowActive)),
        };

        match self.client.replace_discounts(class_id, &discounts).await {
            Ok(response) => {
                info!(class_id, count = response.discounts.len(), "discounts saved");
                self.draft.discounts = DiscountEditor::new(&response.discounts);
                let message = response.message.as_deref().unwrap_or("Discounts updated");
                self.notifier.notify(NoticeLevel::Success, message);
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    // Notes

    /// Adds the typed note to a class that is not saved yet.
    pub fn add_note(&mut self) -> Result<(), FormError> {
        let note = validate_note(&self.draft.note).map_err(|err| self.fail(err.into()))?;
        self.draft.prepend_note(note);
        self.draft.note.clear();
        Ok(())
    }

    pub fn remove_note(&mut self, content: &str) -> usize {
        self.draft.remove_note(content)
    }

    /// Sends the typed note for a saved class; only the notes are taken back.
    pub async fn submit_note(&mut self) -> Result<(), FormError> {
        let class_id = self.require_edit().map_err(|err| self.fail(err))?;
        let note = validate_note(&self.draft.note).map_err(|err| self.fail(err.into()))?;

        match self.client.add_note(class_id, &NotePayload { note }).await {
            Ok(class) => {
                info!(class_id, notes = class.notes.len(), "note saved");
                self.draft.apply_notes(&class);
                self.notifier.notify(NoticeLevel::Success, "Note saved");
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    // Resources

    /// Rooms of the selected location.
    pub fn rooms(&self) -> &[Room] {
        self.reference
            .as_ref()
            .zip(self.draft.resources.location_id)
            .and_then(|(reference, id)| reference.location(id))
            .map(|location| location.rooms.as_slice())
            .unwrap_or_default()
    }

    /// Sends staff, location and room of a saved class.
    pub async fn submit_resources(&mut self) -> Result<(), FormError> {
        let class_id = self.require_edit().map_err(|err| self.fail(err))?;
        let reference = self.require_loaded().map_err(|err| self.fail(err))?;
        let resources = validate_resources(&self.draft.resources, reference)
            .map_err(|err| self.fail(err.into()))?;

        match self.client.update_resources(class_id, &resources).await {
            Ok(class) => {
                info!(class_id, location_id = resources.location_id, "resources saved");
                self.draft.apply_resources(&class);
                self.notifier.notify(NoticeLevel::Success, "Resources updated");
                Ok(())
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    // Main form

    /// Creates the class, or saves the main fields of an existing one.
    pub async fn submit(&mut self) -> Result<Class, FormError> {
        let reference = self.require_loaded().map_err(|err| self.fail(err))?;
        let payload = self
            .draft
            .to_payload(self.mode, reference)
            .map_err(|err| self.fail(err.into()))?;

        let result = match (self.mode, self.draft.id) {
            (FormMode::Create, _) => self.client.create_class(&payload).await,
            (FormMode::Edit, Some(id)) => self.client.update_class(id, &payload).await,
            (FormMode::Edit, None) => return Err(self.fail(FormError::MissingClassId)),
        };

        match result {
            Ok(class) => {
                info!(class_id = ?class.id, mode = ?self.mode, "class saved");
                match self.mode {
                    FormMode::Create => {
                        self.draft = ClassDraft::from_class(&class);
                        self.mode = FormMode::Edit;
                        self.notifier.notify(NoticeLevel::Success, "Class created");
                    }
                    FormMode::Edit => {
                        self.draft.apply_core(&class);
                        self.notifier.notify(NoticeLevel::Success, "Class updated");
                    }
                }
                Ok(class)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    // Sessions

    pub fn upcoming_sessions(&self) -> Vec<SessionGroup> {
        upcoming_sessions(
            self.draft.class_type(),
            self.draft.sessions(),
            self.draft.terms(),
            self.today(),
        )
    }

    pub fn view_students(&self, session_id: i64) {
        self.navigator.push(Route::Attendance { session_id });
    }

    pub fn show_past_sessions(&self) -> Result<(), FormError> {
        let Some(class_id) = self.draft.id else {
            return Err(self.fail(FormError::MissingClassId));
        };
        self.navigator.push(Route::PastSessions { class_id });
        Ok(())
    }
}
