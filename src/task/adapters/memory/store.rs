//! In-memory task store for tests and database-less deployments.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{ConcurrencyToken, NewTaskRecord, TaskChanges, TaskId, TaskRecord},
    ports::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store.
///
/// Every operation runs under a single lock acquisition, which gives each
/// read a consistent snapshot and makes each mutation atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, TaskRecord>,
    last_id: i64,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskStoreResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskStoreResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskState {
    /// Allocates the next identifier. Identifiers are never reused, even
    /// after deletion.
    fn allocate_id(&mut self) -> TaskStoreResult<TaskId> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| TaskStoreError::persistence(std::io::Error::other("task ids exhausted")))?;
        let id = TaskId::new(next).map_err(TaskStoreError::persistence)?;
        self.last_id = next;
        Ok(id)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, record: NewTaskRecord) -> TaskStoreResult<TaskRecord> {
        let mut state = self.write()?;
        let id = state.allocate_id()?;
        let stored = TaskRecord::from_new(id, ConcurrencyToken::generate(), record);
        state.tasks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: TaskId) -> TaskStoreResult<Option<TaskRecord>> {
        let state = self.read()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list(&self, filter: TaskFilter) -> TaskStoreResult<Vec<TaskRecord>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn update_conditional(
        &self,
        id: TaskId,
        changes: TaskChanges,
        expected: ConcurrencyToken,
    ) -> TaskStoreResult<TaskRecord> {
        let mut state = self.write()?;
        let current = state
            .tasks
            .remove(&id)
            .ok_or(TaskStoreError::NotFound(id))?;

        if current.concurrency_token() != expected {
            state.tasks.insert(id, current);
            return Err(TaskStoreError::TokenMismatch(id));
        }

        let updated = current.with_changes(changes, ConcurrencyToken::generate());
        state.tasks.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskStoreError::NotFound(id))
    }

    async fn count(&self, filter: TaskFilter) -> TaskStoreResult<usize> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|record| filter.matches(record))
            .count())
    }
}
