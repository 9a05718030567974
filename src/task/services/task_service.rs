//! Service layer owning the task business rules.

use crate::task::{
    domain::{ConcurrencyToken, Priority, TaskDomainError, TaskId, TaskRecord, TaskStatistics,
        TaskValidationError},
    mapping::{self, TaskView, VersionedTask},
    ports::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult},
    validation::validate_task_fields,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default = "default_priority")]
    priority: i32,
}

fn default_priority() -> i32 {
    i32::from(Priority::NORMAL)
}

impl CreateTaskRequest {
    /// Creates a request with the default priority and no optional fields.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            priority: default_priority(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the priority. Range checking happens in the service.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Request payload replacing every editable field of a task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    priority: i32,
    is_complete: bool,
}

impl UpdateTaskRequest {
    /// Creates a full replacement with no description or due date.
    #[must_use]
    pub fn new(title: impl Into<String>, priority: i32, is_complete: bool) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            priority,
            is_complete,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Service-level settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskServiceConfig {
    store_timeout: Option<Duration>,
}

impl TaskServiceConfig {
    /// Bounds every store call by `timeout`.
    ///
    /// The deadline bounds how long the caller waits. A write whose
    /// deadline elapses may already have committed in the store, so a
    /// timed-out update or delete should be re-read before it is retried.
    /// The `PostgreSQL` pool applies the same limit as the server-side
    /// `statement_timeout` when built from [`crate::config::AppConfig`].
    #[must_use]
    pub const fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = Some(timeout);
        self
    }

    /// Returns the per-call store deadline, if any.
    #[must_use]
    pub const fn store_timeout(&self) -> Option<Duration> {
        self.store_timeout
    }
}

/// Coarse outcome classes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskErrorKind {
    /// Malformed input fields.
    Validation,
    /// Out-of-range query parameter.
    InvalidArgument,
    /// Referenced task absent.
    NotFound,
    /// Stale concurrency token on an existing task.
    ConcurrencyConflict,
    /// Store failure.
    StoreUnavailable,
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Input fields failed validation.
    #[error(transparent)]
    Validation(#[from] TaskValidationError),

    /// A query parameter was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(TaskDomainError),

    /// The task does not exist.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The task was modified by another caller.
    #[error("task {0} was modified by another process")]
    ConcurrencyConflict(TaskId),

    /// The store failed.
    #[error("task store unavailable: {0}")]
    StoreUnavailable(TaskStoreError),
}

impl TaskServiceError {
    /// Returns the outcome class of this error.
    #[must_use]
    pub const fn kind(&self) -> TaskErrorKind {
        match self {
            Self::Validation(_) => TaskErrorKind::Validation,
            Self::InvalidArgument(_) => TaskErrorKind::InvalidArgument,
            Self::NotFound(_) => TaskErrorKind::NotFound,
            Self::ConcurrencyConflict(_) => TaskErrorKind::ConcurrencyConflict,
            Self::StoreUnavailable(_) => TaskErrorKind::StoreUnavailable,
        }
    }
}

impl From<TaskStoreError> for TaskServiceError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => Self::NotFound(id),
            TaskStoreError::TokenMismatch(id) => Self::ConcurrencyConflict(id),
            unavailable @ (TaskStoreError::Timeout(_) | TaskStoreError::Persistence(_)) => {
                Self::StoreUnavailable(unavailable)
            }
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task orchestration service.
///
/// The service holds no mutable state of its own; all state lives in the
/// store, so clones may be shared freely between concurrent callers.
pub struct TaskService<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: TaskServiceConfig,
}

impl<S, C> Clone for TaskService<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            config: self.config,
        }
    }
}

impl<S, C> TaskService<S, C>
where
    S: TaskStore + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task service with default settings.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            config: TaskServiceConfig::default(),
        }
    }

    /// Replaces the service settings.
    #[must_use]
    pub fn with_config(mut self, config: TaskServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] listing every invalid field,
    /// or [`TaskServiceError::StoreUnavailable`] when persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskServiceResult<TaskView> {
        let fields = validate_task_fields(
            request.title,
            request.description,
            request.due_date,
            request.priority,
        )?;
        let now = self.clock.utc();
        let record = self
            .guarded("insert", self.store.insert(mapping::to_new_record(fields, now)))
            .await?;

        info!(task_id = %record.id(), "created task");
        Ok(mapping::to_view(&record, now))
    }

    /// Returns the task with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task is absent.
    pub async fn get_task(&self, id: TaskId) -> TaskServiceResult<TaskView> {
        let record = self.fetch(id).await?;
        Ok(mapping::to_view(&record, self.clock.utc()))
    }

    /// Returns the task together with the token required to update it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task is absent.
    pub async fn get_task_for_update(&self, id: TaskId) -> TaskServiceResult<VersionedTask> {
        let record = self.fetch(id).await?;
        Ok(mapping::to_versioned(&record, self.clock.utc()))
    }

    /// Returns every task, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::StoreUnavailable`] when the store fails.
    pub async fn list_tasks(&self) -> TaskServiceResult<Vec<TaskView>> {
        let views = self.list_newest_first(TaskFilter::all()).await?;
        info!(count = views.len(), "listed tasks");
        Ok(views)
    }

    /// Returns tasks with the given completion flag, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::StoreUnavailable`] when the store fails.
    pub async fn list_by_status(&self, completed: bool) -> TaskServiceResult<Vec<TaskView>> {
        let views = self
            .list_newest_first(TaskFilter::by_status(completed))
            .await?;
        info!(
            count = views.len(),
            status = if completed { "completed" } else { "pending" },
            "listed tasks by status"
        );
        Ok(views)
    }

    /// Returns tasks with the given priority, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::InvalidArgument`] when `priority` lies
    /// outside `1..=5`.
    pub async fn list_by_priority(&self, priority: i32) -> TaskServiceResult<Vec<TaskView>> {
        let level = Priority::new(priority).map_err(TaskServiceError::InvalidArgument)?;
        let views = self
            .list_newest_first(TaskFilter::by_priority(level))
            .await?;
        info!(count = views.len(), priority, "listed tasks by priority");
        Ok(views)
    }

    /// Returns pending tasks past their due date, earliest due first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::StoreUnavailable`] when the store fails.
    pub async fn list_overdue(&self) -> TaskServiceResult<Vec<TaskView>> {
        let now = self.clock.utc();
        let mut records = self
            .guarded("list", self.store.list(TaskFilter::overdue_at(now)))
            .await?;
        records.sort_by(|left, right| {
            left.due_date()
                .cmp(&right.due_date())
                .then_with(|| left.id().cmp(&right.id()))
        });

        info!(count = records.len(), "listed overdue tasks");
        Ok(mapping::to_views(&records, now))
    }

    /// Replaces the editable fields of a task.
    ///
    /// The write only commits if the record still carries
    /// `expected_token`; when no token is supplied, the token read by this
    /// call is used.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for invalid fields,
    /// [`TaskServiceError::NotFound`] when the task is absent (including
    /// when it vanishes mid-update), and
    /// [`TaskServiceError::ConcurrencyConflict`] when the token is stale.
    pub async fn update_task(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
        expected_token: Option<ConcurrencyToken>,
    ) -> TaskServiceResult<TaskView> {
        let fields = validate_task_fields(
            request.title,
            request.description,
            request.due_date,
            request.priority,
        )?;
        let current = self.fetch(id).await?;
        let now = self.clock.utc();
        let changes = current.replacement(fields, request.is_complete, now);
        let token = expected_token.unwrap_or_else(|| current.concurrency_token());

        match self
            .guarded(
                "update_conditional",
                self.store.update_conditional(id, changes, token),
            )
            .await
        {
            Ok(updated) => {
                info!(task_id = %id, "updated task");
                Ok(mapping::to_view(&updated, now))
            }
            Err(TaskStoreError::TokenMismatch(_)) => {
                self.recheck_after_mismatch(id).await?;
                warn!(task_id = %id, "concurrency conflict while updating task");
                Err(TaskServiceError::ConcurrencyConflict(id))
            }
            Err(err) => Err(not_found_logged(id, err)),
        }
    }

    /// Marks a task complete.
    ///
    /// Completing an already complete task changes nothing and returns its
    /// current view.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task is absent, or
    /// [`TaskServiceError::ConcurrencyConflict`] when another caller
    /// modified it without completing it.
    pub async fn complete_task(&self, id: TaskId) -> TaskServiceResult<TaskView> {
        let current = self.fetch(id).await?;
        let now = self.clock.utc();
        let Some(changes) = current.completion_changes(now) else {
            return Ok(mapping::to_view(&current, now));
        };

        match self
            .guarded(
                "update_conditional",
                self.store
                    .update_conditional(id, changes, current.concurrency_token()),
            )
            .await
        {
            Ok(updated) => {
                info!(task_id = %id, "marked task as complete");
                Ok(mapping::to_view(&updated, now))
            }
            Err(TaskStoreError::TokenMismatch(_)) => {
                let latest = self.recheck_after_mismatch(id).await?;
                if latest.is_complete() {
                    return Ok(mapping::to_view(&latest, now));
                }
                warn!(task_id = %id, "concurrency conflict while completing task");
                Err(TaskServiceError::ConcurrencyConflict(id))
            }
            Err(err) => Err(not_found_logged(id, err)),
        }
    }

    /// Permanently deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task is absent.
    pub async fn delete_task(&self, id: TaskId) -> TaskServiceResult<()> {
        self.fetch(id).await?;
        self.guarded("delete", self.store.delete(id))
            .await
            .map_err(|err| not_found_logged(id, err))?;
        info!(task_id = %id, "deleted task");
        Ok(())
    }

    /// Computes collection statistics from a single snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::StoreUnavailable`] when the store fails.
    pub async fn get_statistics(&self) -> TaskServiceResult<TaskStatistics> {
        let snapshot = self.guarded("list_all", self.store.list_all()).await?;
        let statistics = TaskStatistics::from_snapshot(&snapshot, self.clock.utc());
        info!(
            total = statistics.total,
            completed = statistics.completed,
            "computed task statistics"
        );
        Ok(statistics)
    }

    async fn fetch(&self, id: TaskId) -> TaskServiceResult<TaskRecord> {
        self.guarded("get_by_id", self.store.get_by_id(id))
            .await?
            .ok_or_else(|| {
                warn!(task_id = %id, "task not found");
                TaskServiceError::NotFound(id)
            })
    }

    /// Distinguishes a vanished record from a genuine conflict.
    async fn recheck_after_mismatch(&self, id: TaskId) -> TaskServiceResult<TaskRecord> {
        self.fetch(id).await
    }

    async fn list_newest_first(&self, filter: TaskFilter) -> TaskServiceResult<Vec<TaskView>> {
        let mut records = self.guarded("list", self.store.list(filter)).await?;
        records.sort_by(|left, right| {
            right
                .created_date()
                .cmp(&left.created_date())
                .then_with(|| right.id().cmp(&left.id()))
        });
        Ok(mapping::to_views(&records, self.clock.utc()))
    }

    /// Runs a store call under the configured deadline, recording store
    /// failures before they propagate.
    async fn guarded<T, F>(&self, operation: &'static str, call: F) -> TaskStoreResult<T>
    where
        F: Future<Output = TaskStoreResult<T>> + Send,
    {
        let result = match self.config.store_timeout() {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(TaskStoreError::Timeout(limit))),
            None => call.await,
        };

        if let Some(err) = result.as_ref().err().filter(|err| err.is_unavailable()) {
            error!(operation, error = %err, "task store call failed");
        }
        result
    }
}

fn not_found_logged(id: TaskId, err: TaskStoreError) -> TaskServiceError {
    if matches!(err, TaskStoreError::NotFound(_)) {
        warn!(task_id = %id, "task not found");
    }
    TaskServiceError::from(err)
}
