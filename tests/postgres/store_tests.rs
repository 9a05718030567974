//! `PostgreSQL` store and service tests against a live database.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use super::helpers::{BoxError, TestDatabase, database};
use chrono::{Duration, Utc};
use diesel::RunQueryDsl;
use mockable::DefaultClock;
use rstest::rstest;
use taskkeeper::task::adapters::postgres::connect_pool;
use taskkeeper::task::{
    domain::{CompletionState, ConcurrencyToken, NewTaskRecord, Priority, TaskChanges},
    ports::{TaskFilter, TaskStore, TaskStoreError},
    services::{CreateTaskRequest, TaskErrorKind, TaskService, UpdateTaskRequest},
};

fn new_record(title: &str, priority: Priority) -> NewTaskRecord {
    NewTaskRecord {
        title: title.to_owned(),
        description: Some("stored remotely".to_owned()),
        due_date: None,
        priority,
        created_date: Utc::now(),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn insert_and_fetch_round_trip(
    database: Result<TestDatabase, BoxError>,
) -> Result<(), BoxError> {
    let database = database?;
    let store = database.store()?;

    let inserted = store.insert(new_record("Persist me", Priority::HIGH)).await?;
    let fetched = store
        .get_by_id(inserted.id())
        .await?
        .ok_or("inserted task should be found")?;

    assert_eq!(fetched.id(), inserted.id());
    assert_eq!(fetched.title(), "Persist me");
    assert_eq!(fetched.priority(), Priority::HIGH);
    assert_eq!(fetched.concurrency_token(), inserted.concurrency_token());
    assert!(!fetched.is_complete());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conditional_update_checks_token_and_existence(
    database: Result<TestDatabase, BoxError>,
) -> Result<(), BoxError> {
    let database = database?;
    let store = database.store()?;
    let inserted = store.insert(new_record("Draft", Priority::LOW)).await?;
    let changes = TaskChanges {
        title: "Done".to_owned(),
        description: None,
        due_date: None,
        priority: Priority::NORMAL,
        completion: CompletionState::Complete {
            completed_date: Utc::now(),
        },
    };

    let stale = store
        .update_conditional(inserted.id(), changes.clone(), ConcurrencyToken::generate())
        .await;
    let updated = store
        .update_conditional(inserted.id(), changes.clone(), inserted.concurrency_token())
        .await?;
    store.delete(inserted.id()).await?;
    let missing = store
        .update_conditional(inserted.id(), changes, updated.concurrency_token())
        .await;

    assert!(matches!(stale, Err(TaskStoreError::TokenMismatch(_))));
    assert!(updated.is_complete());
    assert_eq!(updated.description(), None);
    assert_ne!(updated.concurrency_token(), inserted.concurrency_token());
    assert!(matches!(missing, Err(TaskStoreError::NotFound(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filters_translate_to_matching_queries(
    database: Result<TestDatabase, BoxError>,
) -> Result<(), BoxError> {
    let database = database?;
    let store = database.store()?;
    let mut overdue = new_record("Overdue", Priority::CRITICAL);
    overdue.due_date = Some(Utc::now() - Duration::days(1));
    store.insert(overdue).await?;
    store.insert(new_record("Undated", Priority::HIGH)).await?;
    store.insert(new_record("Low", Priority::LOW)).await?;

    let now = Utc::now();
    assert_eq!(store.count(TaskFilter::all()).await?, 3);
    assert_eq!(store.count(TaskFilter::overdue_at(now)).await?, 1);
    assert_eq!(store.count(TaskFilter::pending_high_priority()).await?, 2);
    assert_eq!(
        store.list(TaskFilter::by_priority(Priority::LOW)).await?.len(),
        1
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn service_lifecycle_over_postgres(
    database: Result<TestDatabase, BoxError>,
) -> Result<(), BoxError> {
    let database = database?;
    let service = TaskService::new(Arc::new(database.store()?), Arc::new(DefaultClock));

    let created = service
        .create_task(CreateTaskRequest::new("Buy milk").with_priority(4))
        .await?;
    let versioned = service.get_task_for_update(created.id).await?;
    service
        .update_task(
            created.id,
            UpdateTaskRequest::new("Buy oat milk", 4, true),
            Some(versioned.token),
        )
        .await?;
    let replay = service
        .update_task(
            created.id,
            UpdateTaskRequest::new("Buy soy milk", 4, true),
            Some(versioned.token),
        )
        .await;
    let statistics = service.get_statistics().await?;
    service.delete_task(created.id).await?;
    let gone = service.get_task(created.id).await;

    assert_eq!(
        replay.map_err(|err| err.kind()).err(),
        Some(TaskErrorKind::ConcurrencyConflict)
    );
    assert_eq!(statistics.completed, 1);
    assert_eq!(
        gone.map_err(|err| err.kind()).err(),
        Some(TaskErrorKind::NotFound)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pool_statement_timeout_aborts_slow_queries(
    database: Result<TestDatabase, BoxError>,
) -> Result<(), BoxError> {
    let database = database?;
    let url = database.url().to_owned();

    let (slow, quick) = tokio::task::spawn_blocking(move || -> Result<_, BoxError> {
        let pool = connect_pool(&url, 1, Some(StdDuration::from_millis(50)))?;
        let mut conn = pool.get()?;
        let slow = diesel::sql_query("SELECT pg_sleep(1)").execute(&mut conn);
        let quick = diesel::sql_query("SELECT 1").execute(&mut conn);
        Ok((slow, quick))
    })
    .await??;

    let slow_error = slow.err().ok_or("slow query should be cancelled")?;
    assert!(
        slow_error.to_string().contains("statement timeout"),
        "unexpected error: {slow_error}"
    );
    assert_eq!(quick?, 1);
    Ok(())
}
