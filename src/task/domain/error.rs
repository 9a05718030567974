//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The priority lies outside the supported `1..=5` range.
    #[error("priority must be between 1 and 5, got {0}")]
    PriorityOutOfRange(i32),

    /// Task identifiers are positive store-assigned integers.
    #[error("invalid task identifier {0}, expected a positive integer")]
    InvalidTaskId(i64),

    /// The concurrency token could not be parsed.
    #[error("invalid concurrency token '{0}'")]
    InvalidConcurrencyToken(String),

    /// A persisted record breaks the completion invariant.
    #[error("task {id} has is_complete={is_complete} but completed_date present={has_completed_date}")]
    InconsistentCompletion {
        /// Identifier of the offending record.
        id: i64,
        /// Persisted completion flag.
        is_complete: bool,
        /// Whether a completion timestamp was persisted.
        has_completed_date: bool,
    },
}

/// A single field constraint violated by incoming task data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldViolation {
    /// The title is empty or whitespace only.
    #[error("title is required")]
    EmptyTitle,

    /// The title exceeds the maximum length.
    #[error("title has {actual} characters, exceeds limit of {max}")]
    TitleTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Supplied character count.
        actual: usize,
    },

    /// The description exceeds the maximum length.
    #[error("description has {actual} characters, exceeds limit of {max}")]
    DescriptionTooLong {
        /// Maximum permitted characters.
        max: usize,
        /// Supplied character count.
        actual: usize,
    },

    /// The priority lies outside the supported range.
    #[error("priority must be between 1 and 5, got {0}")]
    PriorityOutOfRange(i32),
}

impl FieldViolation {
    /// Returns the name of the offending field as exposed to callers.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::DescriptionTooLong { .. } => "description",
            Self::PriorityOutOfRange(_) => "priority",
        }
    }
}

/// Every field violation found in one piece of task input.
///
/// Validation never stops at the first problem, so callers can report all
/// of them at once. The violation list is never empty.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid task fields: {}", format_violations(.violations))]
pub struct TaskValidationError {
    violations: Vec<FieldViolation>,
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TaskValidationError {
    /// Builds an error from collected violations.
    ///
    /// Returns `None` when nothing was violated.
    #[must_use]
    pub fn from_violations(violations: Vec<FieldViolation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    /// Returns the violations in field order.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns `true` if any violation concerns the named field.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|violation| violation.field() == field)
    }
}
