//! In-memory integration tests for votes and review decisions.

use super::helpers::{
    Cast, Harness, TestService, approve, cast, harness, reject, requirement_in_plan_review,
    requirement_in_solution_review, service,
};
use mockable::DefaultClock;
use rstest::rstest;
use stagegate::artifact::domain::{ArtifactStatus, PlanId, SolutionId};
use stagegate::review::domain::{
    Opinion, ReviewDecision, ReviewMode, ReviewSession, ReviewSessionDraft, ReviewTarget,
    ReviewType, ReviewerRole, SessionStatus,
};
use stagegate::task::domain::{
    ChangeType, ParticipantRole, ParticipantStatus, TaskRole, TaskStatus, UserId,
};
use stagegate::workflow::{
    WorkflowError, WorkflowErrorKind, WorkflowResult,
    ports::WorkflowStore,
    services::{
        FinalizeReviewRequest, InitiateReviewRequest, ReviewOpinionRequest,
        SubmitSolutionRequest,
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approved_solution_moves_the_task_to_planning(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");

    let finalized = service
        .finalize_review(
            FinalizeReviewRequest::new(submitted.session.id(), cast.creator, true)
                .with_comment("clear and small"),
        )
        .await
        .expect("creator approves");

    assert_eq!(finalized.session.status(), SessionStatus::Completed);
    assert_eq!(
        finalized.session.final_decision(),
        Some(ReviewDecision::Approved)
    );
    assert_eq!(finalized.session.decided_by(), Some(cast.creator));
    assert_eq!(finalized.task.status(), TaskStatus::PendingPlan);

    let solutions = service.solutions(task.id()).await.expect("solutions readable");
    assert_eq!(solutions[0].status(), ArtifactStatus::Approved);

    let records = service
        .review_records(submitted.session.id())
        .await
        .expect("records readable");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reviewer_id(), cast.creator);
    assert_eq!(records[0].reviewer_role(), ReviewerRole::Creator);
    assert_eq!(records[0].opinion(), Opinion::Approve);

    let log = service.change_log(task.id()).await.expect("log readable");
    let entry = log
        .iter()
        .find(|entry| entry.change_type() == ChangeType::ReviewFinalized)
        .expect("decision logged");
    assert_eq!(entry.new_value(), Some("approved"));
    assert_eq!(entry.comment(), Some("clear and small"));
}

#[rstest]
#[case(true, TaskStatus::PendingStart, ArtifactStatus::Approved)]
#[case(false, TaskStatus::PlanRejected, ArtifactStatus::Rejected)]
#[tokio::test(flavor = "multi_thread")]
async fn plan_decision_selects_the_next_status(
    service: TestService,
    cast: Cast,
    #[case] approved: bool,
    #[case] expected_status: TaskStatus,
    #[case] expected_plan: ArtifactStatus,
) {
    let (task, submitted) = requirement_in_plan_review(&service, &cast)
        .await
        .expect("plan submitted");

    let finalized = service
        .finalize_review(FinalizeReviewRequest::new(
            submitted.session.id(),
            cast.creator,
            approved,
        ))
        .await
        .expect("creator decides");

    assert_eq!(finalized.task.status(), expected_status);
    let plans = service
        .execution_plans(task.id())
        .await
        .expect("plans readable");
    assert_eq!(plans[0].status(), expected_plan);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_vote_from_the_same_reviewer_conflicts(service: TestService, cast: Cast) {
    let (_, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    let session_id = submitted.session.id();

    service
        .submit_review_opinion(
            ReviewOpinionRequest::new(session_id, cast.outsider, Opinion::Approve)
                .with_score(80),
        )
        .await
        .expect("first vote recorded");
    let err = service
        .submit_review_opinion(ReviewOpinionRequest::new(
            session_id,
            cast.outsider,
            Opinion::Reject,
        ))
        .await
        .expect_err("second vote refused");

    assert!(matches!(err, WorkflowError::AlreadyVoted { .. }));
    assert_eq!(err.kind(), WorkflowErrorKind::Conflict);
    let records = service
        .review_records(session_id)
        .await
        .expect("records readable");
    let mine: Vec<_> = records
        .iter()
        .filter(|record| record.reviewer_id() == cast.outsider)
        .collect();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].opinion(), Opinion::Approve);
    assert_eq!(mine[0].score(), Some(80));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn votes_do_not_close_the_session(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");

    service
        .submit_review_opinion(ReviewOpinionRequest::new(
            submitted.session.id(),
            cast.juror,
            Opinion::Approve,
        ))
        .await
        .expect("vote recorded");

    let tally = service
        .review_tally(submitted.session.id())
        .await
        .expect("tally readable");
    assert_eq!(tally.approvals, 1);
    assert!(tally.quorum_reached());
    let session = service
        .review_session(submitted.session.id())
        .await
        .expect("session readable");
    assert_eq!(session.status(), SessionStatus::InReview);
    let current = service.task(task.id()).await.expect("task readable");
    assert_eq!(current.status(), TaskStatus::SolutionReview);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creator_decides_but_does_not_vote(service: TestService, cast: Cast) {
    let (_, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");

    let err = service
        .submit_review_opinion(ReviewOpinionRequest::new(
            submitted.session.id(),
            cast.creator,
            Opinion::Approve,
        ))
        .await
        .expect_err("creator vote refused");

    assert_eq!(err.kind(), WorkflowErrorKind::Unauthorized);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_creator_finalizes(service: TestService, cast: Cast) {
    let (_, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");

    for intruder in [cast.executor, cast.outsider] {
        let err = service
            .finalize_review(FinalizeReviewRequest::new(
                submitted.session.id(),
                intruder,
                true,
            ))
            .await
            .expect_err("non-creator refused");
        assert_eq!(err.kind(), WorkflowErrorKind::Unauthorized);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn finalizing_a_closed_session_fails_without_a_second_record(
    service: TestService,
    cast: Cast,
) {
    let (_, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    approve(&service, &cast, &submitted.session)
        .await
        .expect("creator approves");

    let err = service
        .finalize_review(FinalizeReviewRequest::new(
            submitted.session.id(),
            cast.creator,
            false,
        ))
        .await
        .expect_err("session already completed");

    assert_eq!(err.kind(), WorkflowErrorKind::InvalidState);
    let records = service
        .review_records(submitted.session.id())
        .await
        .expect("records readable");
    let creator_records = records
        .iter()
        .filter(|record| record.reviewer_role() == ReviewerRole::Creator)
        .count();
    assert_eq!(creator_records, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn votes_on_a_closed_session_are_refused(service: TestService, cast: Cast) {
    let (_, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    reject(&service, &cast, &submitted.session)
        .await
        .expect("creator rejects");

    let err = service
        .submit_review_opinion(ReviewOpinionRequest::new(
            submitted.session.id(),
            cast.juror,
            Opinion::Approve,
        ))
        .await
        .expect_err("session closed");

    assert_eq!(err.kind(), WorkflowErrorKind::InvalidState);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_review_can_be_reopened_by_the_creator(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    let target = ReviewTarget::Solution(submitted.solution.id());

    let duplicate = service
        .initiate_review(InitiateReviewRequest::new(
            task.id(),
            cast.creator,
            ReviewType::SolutionReview,
            target,
        ))
        .await
        .expect_err("target already under review");
    assert!(matches!(duplicate, WorkflowError::ReviewAlreadyOpen { .. }));

    let cancelled = service
        .cancel_review(submitted.session.id(), cast.creator, "wrong reviewer")
        .await
        .expect("creator cancels");
    assert_eq!(cancelled.status(), SessionStatus::Cancelled);

    let reopened = service
        .initiate_review(
            InitiateReviewRequest::new(task.id(), cast.creator, ReviewType::SolutionReview, target)
                .with_jury([cast.juror, cast.second_juror])
                .with_required_approvals(2),
        )
        .await
        .expect("review reopened");

    assert_eq!(reopened.status(), SessionStatus::InReview);
    assert_eq!(reopened.required_approvals(), 2);
    let sessions = service
        .review_sessions(task.id())
        .await
        .expect("sessions readable");
    assert_eq!(sessions.len(), 2);
    let current = service.task(task.id()).await.expect("task readable");
    assert_eq!(current.status(), TaskStatus::SolutionReview);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_type_must_match_the_task_gate(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");

    let err = service
        .initiate_review(InitiateReviewRequest::new(
            task.id(),
            cast.creator,
            ReviewType::ExecutionPlanReview,
            ReviewTarget::Solution(submitted.solution.id()),
        ))
        .await
        .expect_err("task is not in plan review");

    assert_eq!(err.kind(), WorkflowErrorKind::InvalidState);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn jury_review_seats_each_listed_member(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    service
        .cancel_review(submitted.session.id(), cast.creator, "needs a jury")
        .await
        .expect("creator cancels");

    let session = service
        .initiate_review(
            InitiateReviewRequest::new(
                task.id(),
                cast.creator,
                ReviewType::SolutionReview,
                ReviewTarget::Solution(submitted.solution.id()),
            )
            .with_jury([cast.juror, cast.second_juror])
            .with_required_approvals(2),
        )
        .await
        .expect("jury review opened");

    assert_eq!(session.mode(), ReviewMode::Jury);
    let participants = service
        .participants(task.id())
        .await
        .expect("participants readable");
    let mut jurors: Vec<UserId> = participants
        .iter()
        .filter(|p| p.role() == ParticipantRole::Jury)
        .inspect(|p| assert_eq!(p.status(), ParticipantStatus::Pending))
        .map(|p| p.user_id())
        .collect();
    jurors.sort();
    let mut expected = vec![cast.juror, cast.second_juror];
    expected.sort();
    assert_eq!(jurors, expected);

    let roles = service
        .roles(task.id(), cast.second_juror)
        .await
        .expect("roles derived");
    assert!(roles.contains(TaskRole::Jury));
}

#[rstest]
#[case::executor(TaskRole::Executor)]
#[case::observer(TaskRole::Observer)]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_creator_initiates_reviews(
    service: TestService,
    cast: Cast,
    #[case] role: TaskRole,
) {
    let actor = if role == TaskRole::Executor {
        cast.executor
    } else {
        cast.outsider
    };
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    service
        .cancel_review(submitted.session.id(), cast.creator, "restart")
        .await
        .expect("creator cancels");

    let err = service
        .initiate_review(InitiateReviewRequest::new(
            task.id(),
            actor,
            ReviewType::SolutionReview,
            ReviewTarget::Solution(submitted.solution.id()),
        ))
        .await
        .expect_err("only the creator opens reviews");

    assert_eq!(err.kind(), WorkflowErrorKind::Unauthorized);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn review_target_must_belong_to_the_task(service: TestService, cast: Cast) {
    let (task, _) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    let (_, elsewhere) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("second solution submitted");
    let target = ReviewTarget::Solution(elsewhere.solution.id());

    let err = service
        .initiate_review(InitiateReviewRequest::new(
            task.id(),
            cast.creator,
            ReviewType::SolutionReview,
            target,
        ))
        .await
        .expect_err("solution belongs to another task");

    assert!(matches!(
        err,
        WorkflowError::TargetNotInTask { task_id, target: t } if task_id == task.id() && t == target
    ));
    assert_eq!(err.kind(), WorkflowErrorKind::NotFound);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_solution_target_is_not_found(service: TestService, cast: Cast) {
    let (task, _) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    let missing = SolutionId::new();

    let err = service
        .initiate_review(InitiateReviewRequest::new(
            task.id(),
            cast.creator,
            ReviewType::SolutionReview,
            ReviewTarget::Solution(missing),
        ))
        .await
        .expect_err("no such solution");

    assert!(matches!(err, WorkflowError::SolutionNotFound(id) if id == missing));
    assert_eq!(err.kind(), WorkflowErrorKind::NotFound);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_plan_target_is_not_found(service: TestService, cast: Cast) {
    let (task, _) = requirement_in_plan_review(&service, &cast)
        .await
        .expect("plan submitted");
    let missing = PlanId::new();

    let err = service
        .initiate_review(InitiateReviewRequest::new(
            task.id(),
            cast.creator,
            ReviewType::ExecutionPlanReview,
            ReviewTarget::ExecutionPlan(missing),
        ))
        .await
        .expect_err("no such plan");

    assert!(matches!(err, WorkflowError::PlanNotFound(id) if id == missing));
    assert_eq!(err.kind(), WorkflowErrorKind::NotFound);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn superseded_solution_cannot_be_reviewed_again(service: TestService, cast: Cast) {
    let (task, first) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    reject(&service, &cast, &first.session)
        .await
        .expect("creator rejects");
    let second = service
        .submit_solution(SubmitSolutionRequest::new(
            task.id(),
            cast.executor,
            "approach B",
        ))
        .await
        .expect("solution resubmitted");

    let err = service
        .initiate_review(InitiateReviewRequest::new(
            task.id(),
            cast.creator,
            ReviewType::SolutionReview,
            ReviewTarget::Solution(first.solution.id()),
        ))
        .await
        .expect_err("version 1 is superseded");

    assert!(matches!(err, WorkflowError::StaleTarget { .. }));
    assert_eq!(err.kind(), WorkflowErrorKind::InvalidState);
    let solutions = service.solutions(task.id()).await.expect("solutions readable");
    assert_eq!(solutions[0].status(), ArtifactStatus::Rejected);
    assert_eq!(solutions[1].status(), ArtifactStatus::Pending);
    let current = service
        .review_session(second.session.id())
        .await
        .expect("session readable");
    assert_eq!(current.status(), SessionStatus::InReview);
    let sessions = service
        .review_sessions(task.id())
        .await
        .expect("sessions readable");
    assert_eq!(sessions.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn finalising_waits_for_other_open_sessions(harness: Harness, cast: Cast) {
    let Harness { service, store } = harness;
    let (task, first) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    reject(&service, &cast, &first.session)
        .await
        .expect("creator rejects");
    let second = service
        .submit_solution(SubmitSolutionRequest::new(
            task.id(),
            cast.executor,
            "approach B",
        ))
        .await
        .expect("solution resubmitted");
    let leftover = ReviewSession::open(
        ReviewSessionDraft {
            task_id: task.id(),
            review_type: ReviewType::SolutionReview,
            target: ReviewTarget::Solution(first.solution.id()),
            mode: ReviewMode::Single,
            required_approvals: 1,
            initiated_by: cast.creator,
        },
        &DefaultClock,
    )
    .expect("valid session");
    let leftover_id = leftover.id();
    store
        .transaction(move |tx| -> WorkflowResult<()> { Ok(tx.insert_session(&leftover)?) })
        .await
        .expect("leftover session stored");

    let err = service
        .finalize_review(FinalizeReviewRequest::new(
            second.session.id(),
            cast.creator,
            true,
        ))
        .await
        .expect_err("another session is still in review");

    assert!(matches!(
        err,
        WorkflowError::OtherReviewOpen { open_session_id, .. } if open_session_id == leftover_id
    ));
    assert_eq!(err.kind(), WorkflowErrorKind::InvalidState);
    let current = service.task(task.id()).await.expect("task readable");
    assert_eq!(current.status(), TaskStatus::SolutionReview);
    let records = service
        .review_records(second.session.id())
        .await
        .expect("records readable");
    assert!(records.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn requirement_runs_from_acceptance_to_completion(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_plan_review(&service, &cast)
        .await
        .expect("plan submitted");
    approve(&service, &cast, &submitted.session)
        .await
        .expect("plan approved");

    service
        .transition_task(task.id(), cast.executor, TaskStatus::InProgress, None)
        .await
        .expect("work starts");
    let done = service
        .transition_task(task.id(), cast.executor, TaskStatus::Completed, None)
        .await
        .expect("work completes");

    assert_eq!(done.status(), TaskStatus::Completed);
    let log = service.change_log(task.id()).await.expect("log readable");
    let statuses: Vec<&str> = log
        .iter()
        .filter(|entry| entry.change_type() == ChangeType::StatusChange)
        .filter_map(|entry| entry.new_value())
        .collect();
    assert_eq!(
        statuses,
        vec![
            "pending_solution",
            "solution_review",
            "pending_plan",
            "plan_review",
            "pending_start",
            "in_progress",
            "completed",
        ]
    );
}
