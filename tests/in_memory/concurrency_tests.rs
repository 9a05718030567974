//! Competing writers against one in-memory store.

use super::helpers::{TestService, create_task, service};
use rstest::rstest;
use taskkeeper::task::services::{TaskErrorKind, UpdateTaskRequest};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_agree_on_one_completed_date(
    service: TestService,
) -> Result<(), eyre::Report> {
    let created = create_task(&service, "Shared chore", 3).await?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let worker = service.clone();
            tokio::spawn(async move { worker.complete_task(created.id).await })
        })
        .collect();

    let mut dates = Vec::new();
    for handle in handles {
        let outcome = handle.await?;
        match outcome {
            Ok(view) => dates.push(view.completed_date),
            Err(err) => eyre::ensure!(
                err.kind() == TaskErrorKind::ConcurrencyConflict,
                "unexpected completion failure: {err}"
            ),
        }
    }

    let stored = service.get_task(created.id).await?;
    eyre::ensure!(stored.is_complete, "task should end complete");
    eyre::ensure!(
        dates.iter().all(|date| *date == stored.completed_date),
        "every successful completion should report the stored date"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_token_admits_exactly_one_writer(service: TestService) -> Result<(), eyre::Report> {
    let created = create_task(&service, "Contended", 3).await?;
    let token = service.get_task_for_update(created.id).await?.token;

    let handles: Vec<_> = (0..6)
        .map(|writer| {
            let worker = service.clone();
            tokio::spawn(async move {
                worker
                    .update_task(
                        created.id,
                        UpdateTaskRequest::new(format!("writer {writer}"), 3, false),
                        Some(token),
                    )
                    .await
            })
        })
        .collect();

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(view) => winners.push(view.title),
            Err(err) => eyre::ensure!(
                err.kind() == TaskErrorKind::ConcurrencyConflict,
                "losers should see a conflict, got {err}"
            ),
        }
    }

    eyre::ensure!(winners.len() == 1, "expected one winner, got {}", winners.len());
    let stored = service.get_task(created.id).await?;
    eyre::ensure!(
        winners.first() == Some(&stored.title),
        "stored title should be the winner's"
    );
    Ok(())
}
