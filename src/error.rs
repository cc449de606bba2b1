use thiserror::Error;

use crate::client::ApiError;
use crate::models::ClassType;

/// A rejected input. `Display` is the exact text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Date selected and the weekday should have same day of week.")]
    ScheduleWeekdayMismatch,
    #[error("Term session date selected and the weekday should have same day of week.")]
    TermWeekdayMismatch,
    #[error("End day and the weekday should have same day of week.")]
    EndDayWeekdayMismatch,
    #[error("End day cannot be before the start day")]
    EndDayBeforeStart,
    #[error("Schedule capacity is required")]
    ScheduleCapacityRequired,
    #[error("Schedule capacity must be a number")]
    ScheduleCapacityNotNumber,
    #[error("Start time is required")]
    StartTimeRequired,
    #[error("End time is required")]
    EndTimeRequired,
    #[error("End time must be at least 15 minutes after start time")]
    EndTimeTooEarly,
    #[error("Term name is required")]
    TermNameRequired,
    #[error("Term capacity is required")]
    TermCapacityRequired,
    #[error("Term capacity must be a number")]
    TermCapacityNotNumber,
    #[error("Term Capacity must be an integer")]
    TermCapacityNotInteger,
    #[error("Term price is required")]
    TermPriceRequired,
    #[error("Term price must be a number")]
    TermPriceNotNumber,
    #[error("Term end date cannot be before its start date")]
    TermDatesReversed,
    #[error("Term must have at least one schedule")]
    TermSchedulesRequired,
    #[error("Discount code is required.")]
    DiscountCodeRequired,
    #[error("Discount is required")]
    DiscountPercentRequired,
    #[error("Discount must be a number")]
    DiscountPercentNotNumber,
    #[error("Discount must be greater than 0")]
    DiscountPercentNotPositive,
    #[error("Class Note cannot be blank.")]
    NoteBlank,
    #[error("Class name is required")]
    ClassNameRequired,
    #[error("Please select a class type")]
    ClassTypeRequired,
    #[error("Please add at least one schedule")]
    SchedulesRequired,
    #[error("Please add at least one term")]
    TermsRequired,
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("Age from cannot be greater than age to")]
    AgeRangeReversed,
    #[error("Location is required")]
    LocationRequired,
    #[error("Please select at least one staff member")]
    StaffRequired,
    #[error("Selected room does not belong to the selected location")]
    RoomNotInLocation,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("Form data is still loading")]
    NotLoaded,
    #[error("Class has not been saved yet")]
    MissingClassId,
    #[error("Class type cannot be changed to {0} now")]
    ClassTypeLocked(ClassType),
    #[error("Please select a class type")]
    ClassTypeNotSelected,
    #[error("Only available when editing an existing class")]
    EditModeOnly,
    #[error("Only available when creating a class")]
    CreateModeOnly,
    #[error("No dialog is open for this action")]
    DialogNotOpen,
    #[error("Finish the discount being edited first")]
    DiscountRowActive,
    #[error("Trial classes are not available for term-based classes")]
    TrialUnavailable,
    #[error("Please add location and staff before adding additional {0}")]
    LocationRequired(&'static str),
    #[error("No entry at position {0}")]
    IndexOutOfRange(usize),
}

impl FormError {
    /// Errors the user can fix by correcting input, as opposed to failed requests.
    pub fn is_validation(&self) -> bool {
        !matches!(self, FormError::Api(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_user_text() {
        assert_eq!(
            ValidationError::TermWeekdayMismatch.to_string(),
            "Term session date selected and the weekday should have same day of week."
        );
        assert_eq!(
            ValidationError::Required("Single Session Price").to_string(),
            "Single Session Price is required"
        );
        let err: FormError = ValidationError::DiscountCodeRequired.into();
        assert_eq!(err.to_string(), "Discount code is required.");
        assert!(err.is_validation());
    }

    #[test]
    fn test_location_guard_message() {
        assert_eq!(
            FormError::LocationRequired("terms").to_string(),
            "Please add location and staff before adding additional terms"
        );
    }
}
