//! Port contracts for task storage.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod store;

pub use store::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult};
