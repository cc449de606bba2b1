use crate::error::ValidationError;
use crate::models::Discount;
use crate::validation::validate_discount;

/// A discount row as typed; percent stays raw text until validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountInput {
    pub id: Option<i64>,
    pub code: String,
    pub percent: String,
}

impl From<&Discount> for DiscountInput {
    fn from(discount: &Discount) -> Self {
        Self {
            id: discount.id,
            code: discount.code.clone(),
            percent: discount.percent.to_string(),
        }
    }
}

/// Which row, if any, is open.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountState {
    Idle,
    /// The last row is new and not yet accepted.
    Adding,
    /// An existing row is open; the snapshot restores it on close.
    Editing { index: usize, snapshot: DiscountInput },
}

/// Edits the discount list one row at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountEditor {
    rows: Vec<DiscountInput>,
    state: DiscountState,
}

impl Default for DiscountEditor {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            state: DiscountState::Idle,
        }
    }
}

impl DiscountEditor {
    pub fn new(discounts: &[Discount]) -> Self {
        Self {
            rows: discounts.iter().map(DiscountInput::from).collect(),
            state: DiscountState::Idle,
        }
    }

    pub fn rows(&self) -> &[DiscountInput] {
        &self.rows
    }

    pub fn state(&self) -> &DiscountState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DiscountState::Idle
    }

    /// The add button is only shown while no row is open.
    pub fn show_add_button(&self) -> bool {
        self.is_idle()
    }

    /// Index of the row currently open for typing.
    pub fn active_row(&self) -> Option<usize> {
        match &self.state {
            DiscountState::Idle => None,
            DiscountState::Adding => self.rows.len().checked_sub(1),
            DiscountState::Editing { index, .. } => Some(*index),
        }
    }

    /// Opens a blank row. Returns false when another row is already open.
    pub fn add(&mut self) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.rows.push(DiscountInput::default());
        self.state = DiscountState::Adding;
        true
    }

    /// Opens an existing row. Returns false when another row is already open.
    pub fn edit(&mut self, index: usize) -> bool {
        if !self.is_idle() {
            return false;
        }
        let Some(row) = self.rows.get(index) else {
            return false;
        };
        self.state = DiscountState::Editing {
            index,
            snapshot: row.clone(),
        };
        true
    }

    /// Mutable access to the open row only.
    pub fn active_mut(&mut self) -> Option<&mut DiscountInput> {
        let index = self.active_row()?;
        self.rows.get_mut(index)
    }

    /// Validates the open row and closes it when it is acceptable.
    /// Returns `None` when no row is open.
    pub fn accept(&mut self) -> Option<Result<Discount, ValidationError>> {
        let index = self.active_row()?;
        let accepted = match validate_discount(&self.rows[index]) {
            Ok(accepted) => accepted,
            Err(err) => return Some(Err(err)),
        };
        self.rows[index] = DiscountInput::from(&accepted);
        self.state = DiscountState::Idle;
        Some(Ok(accepted))
    }

    /// Removes a row. While adding, only the new row can be removed;
    /// while editing, nothing can.
    pub fn remove(&mut self, index: usize) -> Option<DiscountInput> {
        let active = self.active_row();
        match self.state {
            DiscountState::Adding if Some(index) == active => {
                self.state = DiscountState::Idle;
                self.rows.pop()
            }
            DiscountState::Idle if index < self.rows.len() => Some(self.rows.remove(index)),
            _ => None,
        }
    }

    /// Closes the row being edited and discards the unaccepted changes.
    /// A new row has to be accepted or removed instead.
    pub fn close(&mut self) {
        if let DiscountState::Editing { index, snapshot } = &self.state {
            if let Some(row) = self.rows.get_mut(*index) {
                *row = snapshot.clone();
            }
            self.state = DiscountState::Idle;
        }
    }

    /// The accepted list. `None` while a row is open; an error when a
    /// stored row no longer validates.
    pub fn discounts(&self) -> Option<Result<Vec<Discount>, ValidationError>> {
        if !self.is_idle() {
            return None;
        }
        Some(self.rows.iter().map(validate_discount).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved() -> Vec<Discount> {
        vec![Discount {
            id: Some(1),
            code: "EARLY".to_string(),
            percent: 10.0,
        }]
    }

    #[test]
    fn test_add_then_accept_restores_add_button() {
        let mut editor = DiscountEditor::new(&saved());
        assert!(editor.add());
        assert!(!editor.show_add_button());
        let row = editor.active_mut().unwrap();
        row.code = "SIBLING".to_string();
        row.percent = "5".to_string();
        let accepted = editor.accept().unwrap().unwrap();
        assert_eq!(accepted.code, "SIBLING");
        assert!(editor.show_add_button());
        assert_eq!(editor.discounts().unwrap().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_row_stays_open() {
        let mut editor = DiscountEditor::default();
        editor.add();
        editor.active_mut().unwrap().percent = "5".to_string();
        assert_eq!(
            editor.accept().unwrap().unwrap_err(),
            ValidationError::DiscountCodeRequired
        );
        assert_eq!(editor.state(), &DiscountState::Adding);
        assert!(editor.discounts().is_none());
    }

    #[test]
    fn test_accepted_edit_updates_row() {
        let mut editor = DiscountEditor::new(&saved());
        assert!(editor.edit(0));
        assert!(!editor.show_add_button());
        editor.active_mut().unwrap().percent = "25".to_string();
        let accepted = editor.accept().unwrap().unwrap();
        assert_eq!(accepted.id, Some(1));
        assert_eq!(accepted.percent, 25.0);
        assert!(editor.is_idle());
        assert!(editor.show_add_button());
        assert_eq!(editor.rows()[0].percent, "25");
        assert_eq!(editor.discounts().unwrap().unwrap()[0].percent, 25.0);
    }

    #[test]
    fn test_invalid_edit_stays_open() {
        let mut editor = DiscountEditor::new(&saved());
        editor.edit(0);
        editor.active_mut().unwrap().percent = "-5".to_string();
        assert_eq!(
            editor.accept().unwrap().unwrap_err(),
            ValidationError::DiscountPercentNotPositive
        );
        assert!(matches!(editor.state(), DiscountState::Editing { index: 0, .. }));
        assert!(!editor.show_add_button());
    }

    #[test]
    fn test_stored_row_that_fails_validation_is_reported() {
        let editor = DiscountEditor::new(&[Discount {
            id: Some(4),
            code: "ZERO".to_string(),
            percent: 0.0,
        }]);
        assert!(editor.is_idle());
        assert_eq!(
            editor.discounts().unwrap().unwrap_err(),
            ValidationError::DiscountPercentNotPositive
        );
    }

    #[test]
    fn test_second_row_cannot_open_while_one_is_active() {
        let mut editor = DiscountEditor::new(&saved());
        assert!(editor.edit(0));
        assert!(!editor.add());
        assert!(!editor.edit(0));
        assert_eq!(editor.rows().len(), 1);
    }

    #[test]
    fn test_cancel_new_row_removes_it() {
        let mut editor = DiscountEditor::new(&saved());
        editor.add();
        assert!(editor.remove(1).is_some());
        assert!(editor.is_idle());
        assert_eq!(editor.rows().len(), 1);
    }

    #[test]
    fn test_close_edit_discards_changes() {
        let mut editor = DiscountEditor::new(&saved());
        editor.edit(0);
        editor.active_mut().unwrap().percent = "50".to_string();
        assert!(editor.remove(0).is_none());
        editor.close();
        assert!(editor.is_idle());
        assert_eq!(editor.rows()[0].percent, "10");
    }

    #[test]
    fn test_close_does_not_abandon_new_row() {
        let mut editor = DiscountEditor::default();
        editor.add();
        editor.close();
        assert_eq!(editor.state(), &DiscountState::Adding);
    }

    #[test]
    fn test_accept_without_open_row() {
        let mut editor = DiscountEditor::new(&saved());
        assert!(editor.accept().is_none());
    }

    #[test]
    fn test_idle_remove() {
        let mut editor = DiscountEditor::new(&saved());
        assert!(editor.remove(0).is_some());
        assert!(editor.remove(0).is_none());
    }
}
