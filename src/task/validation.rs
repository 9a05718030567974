//! Field validation for incoming task data.
//!
//! Each rule is a pure function returning the violation it detects, if any.
//! [`validate_task_fields`] runs every rule and reports all violations
//! together.

use crate::task::domain::{FieldViolation, Priority, TaskFields, TaskValidationError};
use chrono::{DateTime, Utc};

/// Maximum title length in Unicode scalar values, as `VARCHAR(100)` counts.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum description length in Unicode scalar values.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Checks that the title is present and within the length limit.
#[must_use]
pub fn check_title(title: &str) -> Option<FieldViolation> {
    if title.trim().is_empty() {
        return Some(FieldViolation::EmptyTitle);
    }
    let actual = title.chars().count();
    (actual > MAX_TITLE_CHARS).then_some(FieldViolation::TitleTooLong {
        max: MAX_TITLE_CHARS,
        actual,
    })
}

/// Checks that an optional description is within the length limit.
#[must_use]
pub fn check_description(description: Option<&str>) -> Option<FieldViolation> {
    let actual = description.map_or(0, |text| text.chars().count());
    (actual > MAX_DESCRIPTION_CHARS).then_some(FieldViolation::DescriptionTooLong {
        max: MAX_DESCRIPTION_CHARS,
        actual,
    })
}

/// Checks that the priority lies within `1..=5`.
///
/// # Errors
///
/// Returns [`FieldViolation::PriorityOutOfRange`] for any other value.
pub fn check_priority(priority: i32) -> Result<Priority, FieldViolation> {
    Priority::new(priority).map_err(|_| FieldViolation::PriorityOutOfRange(priority))
}

/// Validates candidate task fields.
///
/// The due date carries no constraint and may precede the creation date.
///
/// # Errors
///
/// Returns [`TaskValidationError`] listing every violated field.
pub fn validate_task_fields(
    title: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: i32,
) -> Result<TaskFields, TaskValidationError> {
    let mut violations = Vec::new();
    violations.extend(check_title(&title));
    violations.extend(check_description(description.as_deref()));
    let checked_priority = check_priority(priority);
    if let Err(violation) = &checked_priority {
        violations.push(violation.clone());
    }

    if let Some(error) = TaskValidationError::from_violations(violations) {
        return Err(error);
    }

    Ok(TaskFields {
        title,
        description,
        due_date,
        // An out-of-range priority has already been reported above.
        priority: checked_priority.unwrap_or_default(),
    })
}
