//! Conversion between stored task records and caller-facing views.
//!
//! Derived fields are computed at mapping time from the supplied `now`, so
//! views never carry stale overdue flags.

use crate::task::domain::{ConcurrencyToken, NewTaskRecord, TaskFields, TaskId, TaskRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Externally visible task representation.
///
/// Carries every record field except the concurrency token, plus the
/// derived `priority_text` and `is_overdue` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    /// Task identifier.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Completion flag.
    pub is_complete: bool,
    /// Creation timestamp.
    pub created_date: DateTime<Utc>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Completion timestamp, present only for complete tasks.
    pub completed_date: Option<DateTime<Utc>>,
    /// Numeric priority.
    pub priority: i32,
    /// Human-readable priority label.
    pub priority_text: &'static str,
    /// Whether the task is pending past its due date.
    pub is_overdue: bool,
}

/// A view paired with the token needed to update the underlying record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedTask {
    /// Current task view.
    pub view: TaskView,
    /// Concurrency token observed with the view.
    pub token: ConcurrencyToken,
}

/// Returns the label for a numeric priority.
///
/// Values outside `1..=5` map to `"Unknown"`.
#[must_use]
pub const fn priority_label(priority: i32) -> &'static str {
    match priority {
        1 => "Low",
        2 => "Below Normal",
        3 => "Normal",
        4 => "High",
        5 => "Critical",
        _ => "Unknown",
    }
}

/// Returns `true` when a due date exists, lies strictly before `now`, and
/// the task is not complete.
#[must_use]
pub fn is_overdue(due_date: Option<DateTime<Utc>>, is_complete: bool, now: DateTime<Utc>) -> bool {
    !is_complete && due_date.is_some_and(|due| due < now)
}

/// Maps a stored record to its view.
#[must_use]
pub fn to_view(record: &TaskRecord, now: DateTime<Utc>) -> TaskView {
    let priority = i32::from(record.priority());
    TaskView {
        id: record.id(),
        title: record.title().to_owned(),
        description: record.description().map(str::to_owned),
        is_complete: record.is_complete(),
        created_date: record.created_date(),
        due_date: record.due_date(),
        completed_date: record.completed_date(),
        priority,
        priority_text: priority_label(priority),
        is_overdue: is_overdue(record.due_date(), record.is_complete(), now),
    }
}

/// Maps a sequence of records, preserving order.
#[must_use]
pub fn to_views(records: &[TaskRecord], now: DateTime<Utc>) -> Vec<TaskView> {
    records.iter().map(|record| to_view(record, now)).collect()
}

/// Maps a record to its view together with its current token.
#[must_use]
pub fn to_versioned(record: &TaskRecord, now: DateTime<Utc>) -> VersionedTask {
    VersionedTask {
        view: to_view(record, now),
        token: record.concurrency_token(),
    }
}

/// Builds the fields of a new pending record created at `now`.
#[must_use]
pub fn to_new_record(fields: TaskFields, now: DateTime<Utc>) -> NewTaskRecord {
    NewTaskRecord {
        title: fields.title,
        description: fields.description,
        due_date: fields.due_date,
        priority: fields.priority,
        created_date: now,
    }
}
