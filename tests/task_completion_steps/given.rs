//! Given steps for task completion BDD scenarios.

use super::world::{TaskCompletionWorld, run_async};
use chrono::{Duration, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskkeeper::task::services::{CreateTaskRequest, UpdateTaskRequest};

fn create(
    world: &mut TaskCompletionWorld,
    request: CreateTaskRequest,
) -> Result<(), eyre::Report> {
    let created = run_async(world.service.create_task(request)).wrap_err("create scenario task")?;
    let versioned = run_async(world.service.get_task_for_update(created.id))
        .wrap_err("read token of scenario task")?;
    world.original_token = Some(versioned.token);
    world.task = Some(created);
    Ok(())
}

#[given(r#"a task "{title}" with priority {priority:i32} due yesterday"#)]
fn overdue_task(
    world: &mut TaskCompletionWorld,
    title: String,
    priority: i32,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(title)
        .with_priority(priority)
        .with_due_date(Utc::now() - Duration::days(1));
    create(world, request)
}

#[given(r#"a task "{title}" with priority {priority:i32} and no due date"#)]
fn undated_task(
    world: &mut TaskCompletionWorld,
    title: String,
    priority: i32,
) -> Result<(), eyre::Report> {
    create(world, CreateTaskRequest::new(title).with_priority(priority))
}

#[given("the task has been marked complete")]
fn task_already_complete(world: &mut TaskCompletionWorld) -> Result<(), eyre::Report> {
    let id = world.current_task()?.id;
    let completed =
        run_async(world.service.complete_task(id)).wrap_err("complete task in scenario setup")?;
    world.first_completion = Some(completed);
    Ok(())
}

#[given(r#"another caller has renamed the task to "{title}""#)]
fn rival_renamed_task(world: &mut TaskCompletionWorld, title: String) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    let (id, priority) = (task.id, task.priority);
    let token = world
        .original_token
        .ok_or_else(|| eyre::eyre!("missing original token in scenario world"))?;
    run_async(world.service.update_task(
        id,
        UpdateTaskRequest::new(title, priority, false),
        Some(token),
    ))
    .wrap_err("rival update in scenario setup")?;
    Ok(())
}
