//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Store-assigned identifier.
    pub id: i64,
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
    /// Completion timestamp.
    pub completed_date: Option<DateTime<Utc>>,
    /// Priority level.
    pub priority: i16,
    /// Concurrency token.
    pub concurrency_token: uuid::Uuid,
}

/// Insert model for task records. The identifier comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
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
    /// Completion timestamp.
    pub completed_date: Option<DateTime<Utc>>,
    /// Priority level.
    pub priority: i16,
    /// Initial concurrency token.
    pub concurrency_token: uuid::Uuid,
}

/// Changeset replacing the mutable columns of a task.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangesRow {
    /// New title.
    pub title: String,
    /// New description.
    pub description: Option<String>,
    /// New completion flag.
    pub is_complete: bool,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New completion timestamp.
    pub completed_date: Option<DateTime<Utc>>,
    /// New priority.
    pub priority: i16,
    /// Replacement concurrency token.
    pub concurrency_token: uuid::Uuid,
}
