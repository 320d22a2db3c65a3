//! In-memory integration tests proving failed operations leave no trace.

use super::helpers::{
    Cast, Harness, accepted_requirement, cast, harness, requirement_in_solution_review,
};
use rstest::rstest;
use stagegate::artifact::domain::ArtifactStatus;
use stagegate::review::domain::{Opinion, SessionStatus};
use stagegate::task::domain::TaskStatus;
use stagegate::workflow::{
    WorkflowErrorKind,
    services::{FinalizeReviewRequest, ReviewOpinionRequest, SubmitSolutionRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_submission_leaves_no_artifact_or_session(harness: Harness, cast: Cast) {
    let Harness { service, store } = harness;
    let task = accepted_requirement(&service, &cast)
        .await
        .expect("task accepted");
    let log_before = service.change_log(task.id()).await.expect("log readable");

    store
        .inject_change_log_failure(true)
        .expect("fault injected");
    let err = service
        .submit_solution(SubmitSolutionRequest::new(task.id(), cast.executor, "approach A"))
        .await
        .expect_err("audit write fails");
    store
        .inject_change_log_failure(false)
        .expect("fault cleared");

    assert_eq!(err.kind(), WorkflowErrorKind::Storage);
    let current = service.task(task.id()).await.expect("task readable");
    assert_eq!(current.status(), TaskStatus::PendingSolution);
    assert!(service.solutions(task.id()).await.expect("readable").is_empty());
    assert!(
        service
            .review_sessions(task.id())
            .await
            .expect("readable")
            .is_empty()
    );
    assert_eq!(
        service.change_log(task.id()).await.expect("log readable"),
        log_before
    );

    let retried = service
        .submit_solution(SubmitSolutionRequest::new(task.id(), cast.executor, "approach A"))
        .await
        .expect("retry succeeds");
    assert_eq!(retried.solution.version().value(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_finalisation_keeps_the_session_open(harness: Harness, cast: Cast) {
    let Harness { service, store } = harness;
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");

    store
        .inject_change_log_failure(true)
        .expect("fault injected");
    let result = service
        .finalize_review(FinalizeReviewRequest::new(
            submitted.session.id(),
            cast.creator,
            true,
        ))
        .await;
    store
        .inject_change_log_failure(false)
        .expect("fault cleared");

    assert!(result.is_err());
    let session = service
        .review_session(submitted.session.id())
        .await
        .expect("session readable");
    assert_eq!(session.status(), SessionStatus::InReview);
    assert_eq!(session.final_decision(), None);
    assert!(
        service
            .review_records(submitted.session.id())
            .await
            .expect("records readable")
            .is_empty()
    );
    let solutions = service.solutions(task.id()).await.expect("readable");
    assert_eq!(solutions[0].status(), ArtifactStatus::Pending);
    let current = service.task(task.id()).await.expect("task readable");
    assert_eq!(current.status(), TaskStatus::SolutionReview);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_removal_keeps_the_vote(harness: Harness, cast: Cast) {
    let Harness { service, store } = harness;
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    let session_id = submitted.session.id();
    service
        .invite_jury_members(session_id, cast.creator, [cast.juror], 1)
        .await
        .expect("jury invited");
    service
        .submit_review_opinion(ReviewOpinionRequest::new(
            session_id,
            cast.juror,
            Opinion::Approve,
        ))
        .await
        .expect("juror votes");

    store
        .inject_change_log_failure(true)
        .expect("fault injected");
    let result = service
        .remove_jury_member(session_id, cast.creator, cast.juror)
        .await;
    store
        .inject_change_log_failure(false)
        .expect("fault cleared");

    assert!(result.is_err());
    let records = service
        .review_records(session_id)
        .await
        .expect("records readable");
    assert_eq!(records.len(), 1);
    let roles = service
        .roles(task.id(), cast.juror)
        .await
        .expect("roles readable");
    assert!(!roles.is_observer_only());
}
