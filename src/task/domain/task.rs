//! Task record aggregate and completion state machine.

use super::{ConcurrencyToken, Priority, TaskDomainError, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion state of a task.
///
/// A completion timestamp exists exactly when the task is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CompletionState {
    /// Work on the task is outstanding.
    Pending,
    /// The task has been completed.
    Complete {
        /// When the task entered the complete state.
        completed_date: DateTime<Utc>,
    },
}

impl CompletionState {
    /// Returns `true` for the complete state.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Returns the completion timestamp, if complete.
    #[must_use]
    pub const fn completed_date(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Pending => None,
            Self::Complete { completed_date } => Some(completed_date),
        }
    }

    /// Applies an explicit completion toggle.
    ///
    /// `Pending -> Complete` stamps `now`, `Complete -> Pending` clears the
    /// stamp, and requesting the current state keeps it untouched.
    #[must_use]
    pub const fn toggle(self, complete: bool, now: DateTime<Utc>) -> Self {
        match (self, complete) {
            (Self::Pending, true) => Self::Complete {
                completed_date: now,
            },
            (Self::Complete { .. }, false) => Self::Pending,
            (unchanged, _) => unchanged,
        }
    }

    fn from_parts(
        id: i64,
        is_complete: bool,
        completed_date: Option<DateTime<Utc>>,
    ) -> Result<Self, TaskDomainError> {
        match (is_complete, completed_date) {
            (false, None) => Ok(Self::Pending),
            (true, Some(date)) => Ok(Self::Complete {
                completed_date: date,
            }),
            (flag, date) => Err(TaskDomainError::InconsistentCompletion {
                id,
                is_complete: flag,
                has_completed_date: date.is_some(),
            }),
        }
    }
}

/// Caller-editable task fields that have passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    /// Task title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Priority level.
    pub priority: Priority,
}

/// Fields of a task that has not been stored yet.
///
/// The store assigns the identifier and the first concurrency token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskRecord {
    /// Task title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Priority level.
    pub priority: Priority,
    /// Creation timestamp.
    pub created_date: DateTime<Utc>,
}

/// Replacement values for the mutable fields of a stored task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title.
    pub title: String,
    /// New description.
    pub description: Option<String>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New priority.
    pub priority: Priority,
    /// New completion state.
    pub completion: CompletionState,
}

/// Stored task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskId,
    title: String,
    description: Option<String>,
    completion: CompletionState,
    created_date: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
    priority: Priority,
    concurrency_token: ConcurrencyToken,
}

/// Parameter object for reconstructing a persisted task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted completion flag.
    pub is_complete: bool,
    /// Persisted creation timestamp.
    pub created_date: DateTime<Utc>,
    /// Persisted due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted completion timestamp.
    pub completed_date: Option<DateTime<Utc>>,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted concurrency token.
    pub concurrency_token: ConcurrencyToken,
}

impl TaskRecord {
    /// Materialises a newly inserted record.
    #[must_use]
    pub fn from_new(id: TaskId, token: ConcurrencyToken, new: NewTaskRecord) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            completion: CompletionState::Pending,
            created_date: new.created_date,
            due_date: new.due_date,
            priority: new.priority,
            concurrency_token: token,
        }
    }

    /// Reconstructs a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InconsistentCompletion`] when the stored
    /// completion flag and completion timestamp disagree.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        let completion =
            CompletionState::from_parts(data.id.value(), data.is_complete, data.completed_date)?;
        Ok(Self {
            id: data.id,
            title: data.title,
            description: data.description,
            completion,
            created_date: data.created_date,
            due_date: data.due_date,
            priority: data.priority,
            concurrency_token: data.concurrency_token,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the completion state.
    #[must_use]
    pub const fn completion(&self) -> CompletionState {
        self.completion
    }

    /// Returns `true` when the task is complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completion.is_complete()
    }

    /// Returns the completion timestamp, if complete.
    #[must_use]
    pub const fn completed_date(&self) -> Option<DateTime<Utc>> {
        self.completion.completed_date()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the current concurrency token.
    #[must_use]
    pub const fn concurrency_token(&self) -> ConcurrencyToken {
        self.concurrency_token
    }

    /// Returns `true` when the task is pending and its due date lies
    /// strictly before `now`.
    #[must_use]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_complete() && self.due_date.is_some_and(|due| due < now)
    }

    /// Builds a full-field replacement, applying completion bookkeeping.
    #[must_use]
    pub fn replacement(&self, fields: TaskFields, complete: bool, now: DateTime<Utc>) -> TaskChanges {
        TaskChanges {
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            priority: fields.priority,
            completion: self.completion.toggle(complete, now),
        }
    }

    /// Builds the changes that mark this task complete.
    ///
    /// Returns `None` when the task is already complete.
    #[must_use]
    pub fn completion_changes(&self, now: DateTime<Utc>) -> Option<TaskChanges> {
        if self.is_complete() {
            return None;
        }
        Some(TaskChanges {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            priority: self.priority,
            completion: self.completion.toggle(true, now),
        })
    }

    /// Returns the record with `changes` applied under a new token.
    ///
    /// Identifier and creation timestamp are never altered.
    #[must_use]
    pub fn with_changes(self, changes: TaskChanges, token: ConcurrencyToken) -> Self {
        Self {
            title: changes.title,
            description: changes.description,
            completion: changes.completion,
            due_date: changes.due_date,
            priority: changes.priority,
            concurrency_token: token,
            ..self
        }
    }
}
