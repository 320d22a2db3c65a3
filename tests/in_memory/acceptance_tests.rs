//! In-memory integration tests for assignment, acceptance and gating.

use super::helpers::{
    Cast, TestService, accepted_requirement, assigned_requirement, cast, service,
};
use rstest::rstest;
use stagegate::task::domain::{ParticipantStatus, TaskRole, TaskStatus, TaskType};
use stagegate::workflow::{
    WorkflowErrorKind,
    services::{CreateTaskRequest, SubmitSolutionRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accepting_a_requirement_opens_the_solution_phase(service: TestService, cast: Cast) {
    let task = assigned_requirement(&service, &cast)
        .await
        .expect("task created");

    let accepted = service
        .accept_task(task.id(), cast.executor)
        .await
        .expect("executor accepts");

    assert_eq!(accepted.status(), TaskStatus::PendingSolution);
    let participants = service
        .participants(task.id())
        .await
        .expect("participants readable");
    let executor_row = participants
        .iter()
        .find(|row| row.user_id() == cast.executor)
        .expect("executor row present");
    assert_eq!(executor_row.status(), ParticipantStatus::Accepted);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accepting_twice_is_an_invalid_state(service: TestService, cast: Cast) {
    let task = accepted_requirement(&service, &cast)
        .await
        .expect("task accepted");

    let err = service
        .accept_task(task.id(), cast.executor)
        .await
        .expect_err("already accepted");

    assert_eq!(err.kind(), WorkflowErrorKind::InvalidState);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_executor_submits_solutions(service: TestService, cast: Cast) {
    let task = accepted_requirement(&service, &cast)
        .await
        .expect("task accepted");

    for intruder in [cast.creator, cast.outsider] {
        let err = service
            .submit_solution(SubmitSolutionRequest::new(task.id(), intruder, "my take"))
            .await
            .expect_err("non-executor refused");
        assert_eq!(err.kind(), WorkflowErrorKind::Unauthorized);
    }
    let solutions = service.solutions(task.id()).await.expect("solutions readable");
    assert!(solutions.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_unit_task_returns_to_the_pool(service: TestService, cast: Cast) {
    let task = service
        .create_task(
            CreateTaskRequest::new(TaskType::Unit, "Rotate keys", cast.creator)
                .with_executor(cast.executor),
        )
        .await
        .expect("task created");

    let rejected = service
        .reject_task(task.id(), cast.executor, "on leave next week")
        .await
        .expect("executor rejects");

    assert_eq!(rejected.status(), TaskStatus::Unassigned);
    assert_eq!(rejected.executor_id(), None);
    let log = service.change_log(task.id()).await.expect("log readable");
    assert!(
        log.iter()
            .any(|entry| entry.comment() == Some("on leave next week"))
    );

    let reassigned = service
        .assign_executor(task.id(), cast.creator, cast.juror)
        .await
        .expect("creator reassigns");
    assert_eq!(reassigned.status(), TaskStatus::PendingAccept);
    assert_eq!(reassigned.executor_id(), Some(cast.juror));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unit_task_runs_to_completion_without_reviews(service: TestService, cast: Cast) {
    let task = service
        .create_task(
            CreateTaskRequest::new(TaskType::Unit, "Rotate keys", cast.creator)
                .with_executor(cast.executor),
        )
        .await
        .expect("task created");
    service
        .accept_task(task.id(), cast.executor)
        .await
        .expect("executor accepts");

    let allowed = service
        .allowed_transitions(task.id(), cast.executor)
        .await
        .expect("transitions readable");
    assert_eq!(allowed, vec![TaskStatus::InProgress]);

    service
        .transition_task(task.id(), cast.executor, TaskStatus::InProgress, None)
        .await
        .expect("work starts");
    let done = service
        .transition_task(
            task.id(),
            cast.executor,
            TaskStatus::Completed,
            Some("keys rotated".to_owned()),
        )
        .await
        .expect("work completes");

    assert_eq!(done.status(), TaskStatus::Completed);
    assert!(
        service
            .review_sessions(task.id())
            .await
            .expect("sessions readable")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn roles_are_derived_per_task(service: TestService, cast: Cast) {
    let task = assigned_requirement(&service, &cast)
        .await
        .expect("task created");

    let creator = service.roles(task.id(), cast.creator).await.expect("roles");
    let executor = service.roles(task.id(), cast.executor).await.expect("roles");
    let outsider = service.roles(task.id(), cast.outsider).await.expect("roles");

    assert!(creator.contains(TaskRole::Creator));
    assert!(executor.contains(TaskRole::Executor));
    assert!(outsider.is_observer_only());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_task_accepts_no_further_moves(service: TestService, cast: Cast) {
    let task = accepted_requirement(&service, &cast)
        .await
        .expect("task accepted");

    let cancelled = service
        .transition_task(
            task.id(),
            cast.creator,
            TaskStatus::Cancelled,
            Some("budget cut".to_owned()),
        )
        .await
        .expect("creator cancels");
    assert_eq!(cancelled.status(), TaskStatus::Cancelled);

    let err = service
        .submit_solution(SubmitSolutionRequest::new(task.id(), cast.executor, "late"))
        .await
        .expect_err("terminal task frozen");
    assert_eq!(err.kind(), WorkflowErrorKind::InvalidState);
}
