//! Then steps for task completion BDD scenarios.

use super::world::{TaskCompletionWorld, run_async};
use rstest_bdd_macros::then;
use taskkeeper::task::services::TaskErrorKind;

fn failure_kind(world: &TaskCompletionWorld) -> Result<TaskErrorKind, eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation result"))?;
    match result {
        Ok(view) => Err(eyre::eyre!("expected failure, got {view:?}")),
        Err(err) => Ok(err.kind()),
    }
}

#[then("the task is complete")]
fn task_is_complete(world: &TaskCompletionWorld) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    eyre::ensure!(task.is_complete, "expected task {} to be complete", task.id);
    eyre::ensure!(
        task.completed_date.is_some(),
        "complete task should carry a completion date"
    );
    eyre::ensure!(!task.is_overdue, "complete task should not be overdue");
    Ok(())
}

#[then("no tasks are overdue")]
fn no_tasks_overdue(world: &TaskCompletionWorld) -> Result<(), eyre::Report> {
    let overdue = run_async(world.service.list_overdue())?;
    eyre::ensure!(overdue.is_empty(), "expected no overdue tasks, found {}", overdue.len());
    Ok(())
}

#[then("the statistics report {completed:usize} completed of {total:usize} total")]
fn statistics_report(
    world: &TaskCompletionWorld,
    completed: usize,
    total: usize,
) -> Result<(), eyre::Report> {
    let statistics = run_async(world.service.get_statistics())?;
    eyre::ensure!(
        statistics.completed == completed && statistics.total == total,
        "expected {completed}/{total}, got {}/{}",
        statistics.completed,
        statistics.total
    );
    eyre::ensure!(statistics.overdue == 0, "overdue count should be zero");
    Ok(())
}

#[then("the completion date is unchanged")]
fn completion_date_unchanged(world: &TaskCompletionWorld) -> Result<(), eyre::Report> {
    let first = world
        .first_completion
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing first completion"))?;
    let task = world.current_task()?;
    eyre::ensure!(
        task.completed_date == first.completed_date,
        "completion date moved from {:?} to {:?}",
        first.completed_date,
        task.completed_date
    );
    Ok(())
}

#[then("the update fails with a concurrency conflict")]
fn update_conflicts(world: &TaskCompletionWorld) -> Result<(), eyre::Report> {
    let kind = failure_kind(world)?;
    eyre::ensure!(
        kind == TaskErrorKind::ConcurrencyConflict,
        "expected a concurrency conflict, got {kind:?}"
    );
    Ok(())
}

#[then("the operation fails with not found")]
fn operation_not_found(world: &TaskCompletionWorld) -> Result<(), eyre::Report> {
    let kind = failure_kind(world)?;
    eyre::ensure!(kind == TaskErrorKind::NotFound, "expected not found, got {kind:?}");
    Ok(())
}

#[then(r#"the task title is "{title}""#)]
fn task_title_is(world: &TaskCompletionWorld, title: String) -> Result<(), eyre::Report> {
    let id = world.current_task()?.id;
    let stored = run_async(world.service.get_task(id))?;
    eyre::ensure!(stored.title == title, "expected title {title}, found {}", stored.title);
    Ok(())
}
