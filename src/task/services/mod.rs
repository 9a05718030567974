//! Application services for task orchestration.

mod task_service;

pub use task_service::{
    CreateTaskRequest, TaskErrorKind, TaskService, TaskServiceConfig, TaskServiceError,
    TaskServiceResult, UpdateTaskRequest,
};
