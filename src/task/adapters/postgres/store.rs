//! `PostgreSQL` store implementation for task records.

use super::{
    models::{NewTaskRow, TaskChangesRow, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        ConcurrencyToken, NewTaskRecord, PersistedTaskData, Priority, TaskChanges, TaskId,
        TaskRecord,
    },
    ports::{TaskFilter, TaskStore, TaskStoreError, TaskStoreResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel::result::Error as DieselError;
use std::time::Duration;

/// `PostgreSQL` connection pool type used by the task store.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// With a `statement_timeout`, the server aborts any statement running
/// longer than the limit and rolls back its transaction, and waiting for a
/// pooled connection is bounded by the same limit.
///
/// # Errors
///
/// Returns [`PoolError`] when the initial connections cannot be opened.
pub fn connect_pool(
    database_url: &str,
    max_size: u32,
    statement_timeout: Option<Duration>,
) -> Result<TaskPgPool, PoolError> {
    let builder = Pool::builder().max_size(max_size);
    let builder = match statement_timeout {
        Some(limit) => builder
            .connection_timeout(limit)
            .connection_customizer(Box::new(StatementTimeout(limit))),
        None => builder,
    };
    builder.build(ConnectionManager::new(database_url))
}

/// Sets the server-side `statement_timeout` on every new connection.
#[derive(Debug, Clone, Copy)]
struct StatementTimeout(Duration);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("SET statement_timeout = {}", self.0.as_millis()))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// `PostgreSQL`-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: TaskPgPool,
}

enum ConditionalUpdate {
    Updated(TaskRow),
    Stale,
    Missing,
}

impl PostgresTaskStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn insert(&self, record: NewTaskRecord) -> TaskStoreResult<TaskRecord> {
        let new_row = to_new_row(record);
        self.run_blocking(move |connection| {
            let row = diesel::insert_into(tasks::table)
                .values(&new_row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            row_to_record(row)
        })
        .await
    }

    async fn get_by_id(&self, id: TaskId) -> TaskStoreResult<Option<TaskRecord>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.value())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskStoreError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn list(&self, filter: TaskFilter) -> TaskStoreResult<Vec<TaskRecord>> {
        self.run_blocking(move |connection| {
            let rows = filtered(filter)
                .load::<TaskRow>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn update_conditional(
        &self,
        id: TaskId,
        changes: TaskChanges,
        expected: ConcurrencyToken,
    ) -> TaskStoreResult<TaskRecord> {
        let changeset = to_changes_row(changes, ConcurrencyToken::generate());
        let raw_id = id.value();
        let expected_token = expected.into_inner();

        let outcome = self
            .run_blocking(move |connection| {
                connection
                    .transaction::<_, DieselError, _>(|conn| {
                        let updated = diesel::update(
                            tasks::table
                                .filter(tasks::id.eq(raw_id))
                                .filter(tasks::concurrency_token.eq(expected_token)),
                        )
                        .set(&changeset)
                        .returning(TaskRow::as_returning())
                        .get_result::<TaskRow>(conn)
                        .optional()?;

                        if let Some(row) = updated {
                            return Ok(ConditionalUpdate::Updated(row));
                        }

                        let exists = diesel::select(diesel::dsl::exists(tasks::table.find(raw_id)))
                            .get_result::<bool>(conn)?;
                        Ok(if exists {
                            ConditionalUpdate::Stale
                        } else {
                            ConditionalUpdate::Missing
                        })
                    })
                    .map_err(TaskStoreError::persistence)
            })
            .await?;

        match outcome {
            ConditionalUpdate::Updated(row) => row_to_record(row),
            ConditionalUpdate::Stale => Err(TaskStoreError::TokenMismatch(id)),
            ConditionalUpdate::Missing => Err(TaskStoreError::NotFound(id)),
        }
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        let deleted = self
            .run_blocking(move |connection| {
                diesel::delete(tasks::table.find(id.value()))
                    .execute(connection)
                    .map_err(TaskStoreError::persistence)
            })
            .await?;

        if deleted == 0 {
            return Err(TaskStoreError::NotFound(id));
        }
        Ok(())
    }

    async fn count(&self, filter: TaskFilter) -> TaskStoreResult<usize> {
        let total = self
            .run_blocking(move |connection| {
                filtered(filter)
                    .count()
                    .get_result::<i64>(connection)
                    .map_err(TaskStoreError::persistence)
            })
            .await?;
        usize::try_from(total).map_err(TaskStoreError::persistence)
    }
}

/// Translates a filter into a boxed `WHERE` clause over the tasks table.
fn filtered(filter: TaskFilter) -> tasks::BoxedQuery<'static, Pg> {
    let mut query = tasks::table.into_boxed();
    if let Some(completed) = filter.completed {
        query = query.filter(tasks::is_complete.eq(completed));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(tasks::priority.eq(priority_column(priority)));
    }
    if let Some(floor) = filter.min_priority {
        query = query.filter(tasks::priority.ge(priority_column(floor)));
    }
    if let Some(limit) = filter.due_before {
        // NULL due dates never compare as earlier.
        query = query.filter(tasks::due_date.lt(limit));
    }
    query
}

fn priority_column(priority: Priority) -> i16 {
    i16::from(priority.value())
}

fn to_new_row(record: NewTaskRecord) -> NewTaskRow {
    NewTaskRow {
        title: record.title,
        description: record.description,
        is_complete: false,
        created_date: record.created_date,
        due_date: record.due_date,
        completed_date: None,
        priority: priority_column(record.priority),
        concurrency_token: ConcurrencyToken::generate().into_inner(),
    }
}

fn to_changes_row(changes: TaskChanges, token: ConcurrencyToken) -> TaskChangesRow {
    TaskChangesRow {
        title: changes.title,
        description: changes.description,
        is_complete: changes.completion.is_complete(),
        due_date: changes.due_date,
        completed_date: changes.completion.completed_date(),
        priority: priority_column(changes.priority),
        concurrency_token: token.into_inner(),
    }
}

fn row_to_record(row: TaskRow) -> TaskStoreResult<TaskRecord> {
    let TaskRow {
        id,
        title,
        description,
        is_complete,
        created_date,
        due_date,
        completed_date,
        priority: persisted_priority,
        concurrency_token,
    } = row;

    let priority =
        Priority::new(i32::from(persisted_priority)).map_err(TaskStoreError::persistence)?;
    let data = PersistedTaskData {
        id: TaskId::new(id).map_err(TaskStoreError::persistence)?,
        title,
        description,
        is_complete,
        created_date,
        due_date,
        completed_date,
        priority,
        concurrency_token: ConcurrencyToken::from_uuid(concurrency_token),
    };
    TaskRecord::from_persisted(data).map_err(TaskStoreError::persistence)
}
