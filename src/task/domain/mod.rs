//! Domain model for task records.
//!
//! The task domain holds the stored record shape, the completion state
//! machine, priority levels, and collection statistics. Nothing here touches
//! storage or transport.

mod error;
mod ids;
mod priority;
mod statistics;
mod task;

pub use error::{FieldViolation, TaskDomainError, TaskValidationError};
pub use ids::{ConcurrencyToken, TaskId};
pub use priority::Priority;
pub use statistics::TaskStatistics;
pub use task::{CompletionState, NewTaskRecord, PersistedTaskData, TaskChanges, TaskFields,
    TaskRecord};
