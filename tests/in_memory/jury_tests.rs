//! In-memory integration tests for jury rosters and advisory tallies.

use super::helpers::{
    Cast, TestService, approve, cast, requirement_in_solution_review, sample_goals, service,
};
use rstest::rstest;
use stagegate::review::domain::{Opinion, ReviewDecision, ReviewMode, SessionStatus};
use stagegate::task::domain::{ParticipantRole, ParticipantStatus, TaskRole, TaskStatus};
use stagegate::workflow::{
    ValidationError, WorkflowError, WorkflowErrorKind,
    services::{FinalizeReviewRequest, ReviewOpinionRequest, SubmitExecutionPlanRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creator_overrides_an_approving_jury(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    let session_id = submitted.session.id();

    let convened = service
        .invite_jury_members(session_id, cast.creator, [cast.juror, cast.second_juror], 2)
        .await
        .expect("jury invited");
    assert_eq!(convened.mode(), ReviewMode::Jury);
    assert_eq!(convened.required_approvals(), 2);
    let jury: Vec<_> = service
        .participants(task.id())
        .await
        .expect("participants readable")
        .into_iter()
        .filter(|row| row.role() == ParticipantRole::Jury)
        .collect();
    assert_eq!(jury.len(), 2);
    assert!(jury.iter().all(|row| row.status() == ParticipantStatus::Pending));

    service
        .submit_review_opinion(ReviewOpinionRequest::new(
            session_id,
            cast.juror,
            Opinion::Approve,
        ))
        .await
        .expect("juror votes");
    let finalized = service
        .finalize_review(FinalizeReviewRequest::new(session_id, cast.creator, false))
        .await
        .expect("creator rejects");

    assert_eq!(finalized.session.status(), SessionStatus::Completed);
    assert_eq!(
        finalized.session.final_decision(),
        Some(ReviewDecision::Rejected)
    );
    assert_eq!(finalized.task.status(), TaskStatus::SolutionRejected);
    let tally = service.review_tally(session_id).await.expect("tally readable");
    assert_eq!(tally.approvals, 1);
    assert_eq!(tally.rejections, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn jury_mode_refuses_votes_from_outside_the_jury(service: TestService, cast: Cast) {
    let (_, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    service
        .invite_jury_members(submitted.session.id(), cast.creator, [cast.juror], 1)
        .await
        .expect("jury invited");

    let err = service
        .submit_review_opinion(ReviewOpinionRequest::new(
            submitted.session.id(),
            cast.outsider,
            Opinion::Approve,
        ))
        .await
        .expect_err("outsider refused");

    assert!(matches!(
        err,
        WorkflowError::Unauthorized {
            required: TaskRole::Jury,
            ..
        }
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_invitations_are_idempotent(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    let session_id = submitted.session.id();

    service
        .invite_jury_members(session_id, cast.creator, [cast.juror], 1)
        .await
        .expect("first invitation");
    let convened = service
        .invite_jury_members(session_id, cast.creator, [cast.juror, cast.juror], 1)
        .await
        .expect("repeat invitation");

    assert_eq!(convened.mode(), ReviewMode::Jury);
    let seats = service
        .participants(task.id())
        .await
        .expect("participants readable")
        .iter()
        .filter(|row| row.role() == ParticipantRole::Jury && row.user_id() == cast.juror)
        .count();
    assert_eq!(seats, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creator_cannot_sit_on_the_jury(service: TestService, cast: Cast) {
    let (_, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");

    let err = service
        .invite_jury_members(
            submitted.session.id(),
            cast.creator,
            [cast.juror, cast.creator],
            1,
        )
        .await
        .expect_err("creator refused as juror");

    assert!(matches!(
        err,
        WorkflowError::Validation(ValidationError::CreatorAsJuror)
    ));
    let session = service
        .review_session(submitted.session.id())
        .await
        .expect("session readable");
    assert_eq!(session.mode(), ReviewMode::Single);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removed_juror_loses_their_vote_and_may_vote_again(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    let session_id = submitted.session.id();
    service
        .invite_jury_members(session_id, cast.creator, [cast.juror, cast.second_juror], 2)
        .await
        .expect("jury invited");
    service
        .submit_review_opinion(ReviewOpinionRequest::new(
            session_id,
            cast.juror,
            Opinion::Reject,
        ))
        .await
        .expect("juror votes");

    service
        .remove_jury_member(session_id, cast.creator, cast.juror)
        .await
        .expect("juror removed");

    let records = service
        .review_records(session_id)
        .await
        .expect("records readable");
    assert!(records.iter().all(|record| record.reviewer_id() != cast.juror));
    let roles = service
        .roles(task.id(), cast.juror)
        .await
        .expect("roles readable");
    assert!(roles.is_observer_only());
    let tally = service.review_tally(session_id).await.expect("tally readable");
    assert_eq!(tally.votes(), 0);

    service
        .invite_jury_members(session_id, cast.creator, [cast.juror], 2)
        .await
        .expect("juror re-invited");
    service
        .submit_review_opinion(ReviewOpinionRequest::new(
            session_id,
            cast.juror,
            Opinion::Approve,
        ))
        .await
        .expect("fresh vote accepted");
    let tally_after = service.review_tally(session_id).await.expect("tally readable");
    assert_eq!(tally_after.approvals, 1);
    assert_eq!(tally_after.rejections, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removing_a_stranger_is_not_found(service: TestService, cast: Cast) {
    let (_, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");

    let err = service
        .remove_jury_member(submitted.session.id(), cast.creator, cast.outsider)
        .await
        .expect_err("no such juror");

    assert!(matches!(err, WorkflowError::JuryMemberNotFound { .. }));
    assert_eq!(err.kind(), WorkflowErrorKind::NotFound);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn roster_is_frozen_once_the_session_closes(service: TestService, cast: Cast) {
    let (_, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    service
        .invite_jury_members(submitted.session.id(), cast.creator, [cast.juror], 1)
        .await
        .expect("jury invited");
    approve(&service, &cast, &submitted.session)
        .await
        .expect("creator approves");

    let invite = service
        .invite_jury_members(submitted.session.id(), cast.creator, [cast.second_juror], 1)
        .await
        .expect_err("closed session");
    let removal = service
        .remove_jury_member(submitted.session.id(), cast.creator, cast.juror)
        .await
        .expect_err("closed session");

    assert_eq!(invite.kind(), WorkflowErrorKind::InvalidState);
    assert_eq!(removal.kind(), WorkflowErrorKind::InvalidState);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn jury_seats_carry_over_to_the_plan_review(service: TestService, cast: Cast) {
    let (task, solution) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    service
        .invite_jury_members(solution.session.id(), cast.creator, [cast.juror], 1)
        .await
        .expect("jury invited");
    approve(&service, &cast, &solution.session)
        .await
        .expect("solution approved");
    let plan = service
        .submit_execution_plan_with_goals(SubmitExecutionPlanRequest::new(
            task.id(),
            cast.executor,
            "two phase import",
            sample_goals(),
        ))
        .await
        .expect("plan submitted");
    service
        .invite_jury_members(plan.session.id(), cast.creator, [cast.second_juror], 2)
        .await
        .expect("plan jury invited");

    service
        .submit_review_opinion(ReviewOpinionRequest::new(
            plan.session.id(),
            cast.juror,
            Opinion::Approve,
        ))
        .await
        .expect("seat from the solution review still counts");
    let tally = service
        .review_tally(plan.session.id())
        .await
        .expect("tally readable");
    assert_eq!(tally.approvals, 1);
    assert!(!tally.quorum_reached());
}
