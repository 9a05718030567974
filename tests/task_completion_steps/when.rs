//! When steps for task completion BDD scenarios.

use super::world::{TaskCompletionWorld, run_async};
use rstest_bdd_macros::when;
use taskkeeper::task::{domain::TaskId, services::UpdateTaskRequest};

#[when("the task is marked complete")]
fn mark_complete(world: &mut TaskCompletionWorld) -> Result<(), eyre::Report> {
    let id = world.current_task()?.id;
    let result = run_async(world.service.complete_task(id));
    if let Ok(ref completed) = result {
        world.task = Some(completed.clone());
    }
    world.last_result = Some(result);
    Ok(())
}

#[when("task {id:i64} is marked complete")]
fn mark_missing_complete(world: &mut TaskCompletionWorld, id: i64) -> Result<(), eyre::Report> {
    let task_id = TaskId::new(id)?;
    world.last_result = Some(run_async(world.service.complete_task(task_id)));
    Ok(())
}

#[when(r#"the task is renamed to "{title}" with the original token"#)]
fn rename_with_original_token(
    world: &mut TaskCompletionWorld,
    title: String,
) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    let (id, priority) = (task.id, task.priority);
    let token = world
        .original_token
        .ok_or_else(|| eyre::eyre!("missing original token in scenario world"))?;
    world.last_result = Some(run_async(world.service.update_task(
        id,
        UpdateTaskRequest::new(title, priority, false),
        Some(token),
    )));
    Ok(())
}
