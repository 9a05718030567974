//! Integration tests mapping service outcomes onto transport replies.

use super::helpers::{TestService, create_task, service};
use http::StatusCode;
use rstest::rstest;
use taskkeeper::task::{
    domain::TaskId,
    http::{TaskOperation, TaskReply, parse_etag},
    services::CreateTaskRequest,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_reply_points_at_new_task(service: TestService) -> Result<(), eyre::Report> {
    let result = service
        .create_task(CreateTaskRequest::new("Write changelog"))
        .await;

    let reply = TaskReply::created(&result);
    let view = result?;

    eyre::ensure!(reply.status == StatusCode::CREATED, "expected 201");
    eyre::ensure!(
        reply.location == Some(format!("/api/tasks/{}", view.id)),
        "unexpected location {:?}",
        reply.location
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn etag_from_versioned_read_is_accepted_for_update(
    service: TestService,
) -> Result<(), eyre::Report> {
    let created = create_task(&service, "Review PR", 2).await?;
    let reply = TaskReply::versioned(&service.get_task_for_update(created.id).await);
    let etag = reply
        .etag
        .ok_or_else(|| eyre::eyre!("versioned reply should carry an etag"))?;

    let token = parse_etag(&etag)?;
    let current = service.get_task_for_update(created.id).await?;

    eyre::ensure!(token == current.token, "etag should carry the current token");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_task_maps_to_not_found(service: TestService) -> Result<(), eyre::Report> {
    let missing = TaskId::new(999)?;

    let reply = TaskReply::from_result(TaskOperation::Delete, &service.delete_task(missing).await);

    eyre::ensure!(reply.status == StatusCode::NOT_FOUND, "expected 404");
    let body = reply
        .body
        .ok_or_else(|| eyre::eyre!("failure replies carry a problem body"))?;
    eyre::ensure!(body["status"] == 404, "problem status should be 404");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_priority_query_maps_to_bad_request(
    service: TestService,
) -> Result<(), eyre::Report> {
    let reply = TaskReply::from_result(
        TaskOperation::ListByPriority,
        &service.list_by_priority(0).await,
    );

    eyre::ensure!(reply.status == StatusCode::BAD_REQUEST, "expected 400");
    Ok(())
}
