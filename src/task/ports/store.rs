//! Store port for durable task CRUD with optimistic concurrency.

use crate::task::domain::{
    ConcurrencyToken, NewTaskRecord, Priority, TaskChanges, TaskId, TaskRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Conjunctive predicate over task records.
///
/// Unset criteria match every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Match on the completion flag.
    pub completed: Option<bool>,
    /// Match an exact priority.
    pub priority: Option<Priority>,
    /// Match priorities at or above this level.
    pub min_priority: Option<Priority>,
    /// Match records with a due date strictly before this instant.
    pub due_before: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// Matches every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches records with the given completion flag.
    #[must_use]
    pub fn by_status(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Matches records with the given priority.
    #[must_use]
    pub fn by_priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    /// Matches pending records due strictly before `now`.
    #[must_use]
    pub fn overdue_at(now: DateTime<Utc>) -> Self {
        Self {
            completed: Some(false),
            due_before: Some(now),
            ..Self::default()
        }
    }

    /// Matches pending records of high or critical priority.
    #[must_use]
    pub fn pending_high_priority() -> Self {
        Self {
            completed: Some(false),
            min_priority: Some(Priority::HIGH),
            ..Self::default()
        }
    }

    /// Evaluates the predicate against a record.
    #[must_use]
    pub fn matches(&self, record: &TaskRecord) -> bool {
        self.completed
            .is_none_or(|completed| record.is_complete() == completed)
            && self
                .priority
                .is_none_or(|priority| record.priority() == priority)
            && self
                .min_priority
                .is_none_or(|floor| record.priority() >= floor)
            && self
                .due_before
                .is_none_or(|limit| record.due_date().is_some_and(|due| due < limit))
    }
}

/// Durable task storage contract.
///
/// Implementations replace a record's concurrency token on every
/// successful mutation and apply each mutation atomically, so a dropped
/// call leaves either the complete change or none of it.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new record, allocating its identifier and first token.
    ///
    /// Returns the stored record.
    async fn insert(&self, record: NewTaskRecord) -> TaskStoreResult<TaskRecord>;

    /// Finds a record by identifier.
    ///
    /// Returns `None` when the record does not exist.
    async fn get_by_id(&self, id: TaskId) -> TaskStoreResult<Option<TaskRecord>>;

    /// Returns every record matching `filter`, read from one snapshot.
    ///
    /// No ordering is guaranteed.
    async fn list(&self, filter: TaskFilter) -> TaskStoreResult<Vec<TaskRecord>>;

    /// Returns every record, read from one snapshot.
    async fn list_all(&self) -> TaskStoreResult<Vec<TaskRecord>> {
        self.list(TaskFilter::all()).await
    }

    /// Replaces the mutable fields of a record if its token still matches.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the record does not exist
    /// and [`TaskStoreError::TokenMismatch`] when `expected` is stale.
    async fn update_conditional(
        &self,
        id: TaskId,
        changes: TaskChanges,
        expected: ConcurrencyToken,
    ) -> TaskStoreResult<TaskRecord>;

    /// Permanently removes a record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the record does not exist.
    async fn delete(&self, id: TaskId) -> TaskStoreResult<()>;

    /// Counts records matching `filter`.
    async fn count(&self, filter: TaskFilter) -> TaskStoreResult<usize>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The record was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The supplied concurrency token is stale.
    #[error("concurrency token mismatch for task {0}")]
    TokenMismatch(TaskId),

    /// The call did not finish within its deadline.
    #[error("task store call timed out after {0:?}")]
    Timeout(Duration),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for failures of the store itself rather than
    /// outcomes about a particular record.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Persistence(_))
    }
}
