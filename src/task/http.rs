//! Transport-neutral response mapping for task operations.
//!
//! Converts service outcomes into status codes, headers and JSON bodies
//! without depending on any web framework, so any HTTP binding can
//! forward the result unchanged.

use crate::task::{
    domain::{ConcurrencyToken, TaskDomainError, TaskId},
    mapping::{TaskView, VersionedTask},
    services::{TaskErrorKind, TaskServiceError, TaskServiceResult},
};
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// Base path of the task resource collection.
pub const TASKS_BASE_PATH: &str = "/api/tasks";

/// Task operations exposed over a request/response transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOperation {
    /// List all tasks.
    List,
    /// Fetch one task.
    Get,
    /// Create a task.
    Create,
    /// Replace a task's fields.
    Update,
    /// Delete a task.
    Delete,
    /// List tasks by completion flag.
    ListByStatus,
    /// List tasks by priority.
    ListByPriority,
    /// List overdue tasks.
    ListOverdue,
    /// Mark a task complete.
    Complete,
    /// Compute statistics.
    Statistics,
}

impl TaskOperation {
    /// Returns the status reported when the operation succeeds.
    #[must_use]
    pub const fn success_status(self) -> StatusCode {
        match self {
            Self::Create => StatusCode::CREATED,
            Self::Update | Self::Delete => StatusCode::NO_CONTENT,
            Self::List
            | Self::Get
            | Self::ListByStatus
            | Self::ListByPriority
            | Self::ListOverdue
            | Self::Complete
            | Self::Statistics => StatusCode::OK,
        }
    }
}

/// One problem reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemDetail {
    /// Offending field, when the problem concerns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    /// Human-readable description.
    pub message: String,
}

/// Error body returned for failed operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemBody {
    /// Numeric status code.
    pub status: u16,
    /// Short summary of the failure.
    pub title: String,
    /// Every individual problem found.
    pub errors: Vec<ProblemDetail>,
}

/// Response produced for a task operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskReply {
    /// Response status.
    pub status: StatusCode,
    /// `Location` header value for created resources.
    pub location: Option<String>,
    /// `ETag` header value carrying the concurrency token.
    pub etag: Option<String>,
    /// JSON body; `None` for bodiless responses.
    pub body: Option<Value>,
}

impl TaskReply {
    /// Builds the reply for an operation outcome.
    #[must_use]
    pub fn from_result<T: Serialize>(
        operation: TaskOperation,
        result: &TaskServiceResult<T>,
    ) -> Self {
        match result {
            Ok(payload) => Self::success(operation, payload),
            Err(err) => Self::failure(err),
        }
    }

    /// Builds the reply for a create outcome, including the new resource's
    /// location.
    #[must_use]
    pub fn created(result: &TaskServiceResult<TaskView>) -> Self {
        match result {
            Ok(view) => Self::success(TaskOperation::Create, view).with_location(view.id),
            Err(err) => Self::failure(err),
        }
    }

    /// Builds the reply for a versioned fetch, exposing the token as an
    /// `ETag`.
    #[must_use]
    pub fn versioned(result: &TaskServiceResult<VersionedTask>) -> Self {
        match result {
            Ok(versioned) => {
                Self::success(TaskOperation::Get, &versioned.view).with_etag(versioned.token)
            }
            Err(err) => Self::failure(err),
        }
    }

    /// Points the reply at the created task.
    ///
    /// Only a `201 Created` reply carries a location.
    #[must_use]
    pub fn with_location(self, id: TaskId) -> Self {
        if self.status != StatusCode::CREATED {
            return self;
        }
        Self {
            location: Some(location_for(id)),
            ..self
        }
    }

    /// Exposes `token` as the reply's `ETag`.
    ///
    /// Only a `200 OK` reply carries a token.
    #[must_use]
    pub fn with_etag(self, token: ConcurrencyToken) -> Self {
        if self.status != StatusCode::OK {
            return self;
        }
        Self {
            etag: Some(etag_for(token)),
            ..self
        }
    }

    /// Builds the reply for a failed operation.
    #[must_use]
    pub fn failure(err: &TaskServiceError) -> Self {
        let problem = problem_for(err);
        let status = status_for(err.kind());
        Self {
            status,
            location: None,
            etag: None,
            body: serde_json::to_value(problem).ok(),
        }
    }

    fn success<T: Serialize + ?Sized>(operation: TaskOperation, payload: &T) -> Self {
        let status = operation.success_status();
        if status == StatusCode::NO_CONTENT {
            return Self::empty(status);
        }

        match serde_json::to_value(payload) {
            Ok(body) => Self {
                status,
                location: None,
                etag: None,
                body: Some(body),
            },
            Err(err) => {
                error!(?operation, error = %err, "failed to serialise task response");
                Self::empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    const fn empty(status: StatusCode) -> Self {
        Self {
            status,
            location: None,
            etag: None,
            body: None,
        }
    }
}

/// Maps an error kind onto its response status.
#[must_use]
pub const fn status_for(kind: TaskErrorKind) -> StatusCode {
    match kind {
        TaskErrorKind::Validation | TaskErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        TaskErrorKind::NotFound => StatusCode::NOT_FOUND,
        TaskErrorKind::ConcurrencyConflict => StatusCode::CONFLICT,
        TaskErrorKind::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Builds the problem body for an error.
///
/// Store failures are reported generically; their detail stays in the
/// logs.
#[must_use]
pub fn problem_for(err: &TaskServiceError) -> ProblemBody {
    let status = status_for(err.kind()).as_u16();
    match err {
        TaskServiceError::Validation(validation) => ProblemBody {
            status,
            title: "One or more validation errors occurred".to_owned(),
            errors: validation
                .violations()
                .iter()
                .map(|violation| ProblemDetail {
                    field: Some(violation.field()),
                    message: violation.to_string(),
                })
                .collect(),
        },
        TaskServiceError::InvalidArgument(argument) => ProblemBody {
            status,
            title: "Invalid argument".to_owned(),
            errors: vec![ProblemDetail {
                field: argument_field(argument),
                message: argument.to_string(),
            }],
        },
        TaskServiceError::NotFound(_) | TaskServiceError::ConcurrencyConflict(_) => ProblemBody {
            status,
            title: err.to_string(),
            errors: Vec::new(),
        },
        TaskServiceError::StoreUnavailable(_) => ProblemBody {
            status,
            title: "An error occurred while processing the request".to_owned(),
            errors: Vec::new(),
        },
    }
}

const fn argument_field(err: &TaskDomainError) -> Option<&'static str> {
    match err {
        TaskDomainError::PriorityOutOfRange(_) => Some("priority"),
        TaskDomainError::InvalidTaskId(_) => Some("id"),
        TaskDomainError::InvalidConcurrencyToken(_) | TaskDomainError::InconsistentCompletion { .. } => {
            None
        }
    }
}

/// Returns the resource path of a task.
#[must_use]
pub fn location_for(id: TaskId) -> String {
    format!("{TASKS_BASE_PATH}/{id}")
}

/// Renders a concurrency token as a strong `ETag` value.
#[must_use]
pub fn etag_for(token: ConcurrencyToken) -> String {
    format!("\"{token}\"")
}

/// Parses an `If-Match`/`ETag` header value back into a token.
///
/// Accepts strong and weak forms, quoted or bare.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidConcurrencyToken`] when the value
/// does not carry a token.
pub fn parse_etag(value: &str) -> Result<ConcurrencyToken, TaskDomainError> {
    let trimmed = value.trim();
    let without_weak = trimmed.strip_prefix("W/").unwrap_or(trimmed);
    let unquoted = without_weak
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(without_weak);
    ConcurrencyToken::parse(unquoted)
        .map_err(|_| TaskDomainError::InvalidConcurrencyToken(value.to_owned()))
}
