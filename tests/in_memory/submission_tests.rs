//! In-memory integration tests for versioned submissions.

use super::helpers::{
    Cast, TestService, accepted_requirement, approve, cast, reject,
    requirement_in_plan_review, requirement_in_solution_review, sample_goals, service,
};
use rstest::rstest;
use stagegate::artifact::domain::{ArtifactStatus, GoalDraft};
use stagegate::review::domain::{ReviewMode, ReviewTarget, SessionStatus};
use stagegate::task::domain::{ChangeType, TaskStatus};
use stagegate::workflow::{
    WorkflowErrorKind,
    services::{SubmitExecutionPlanRequest, SubmitSolutionRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn solution_submission_opens_a_single_review(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");

    assert_eq!(submitted.solution.version().value(), 1);
    assert_eq!(submitted.session.mode(), ReviewMode::Single);
    assert_eq!(submitted.session.required_approvals(), 1);
    assert_eq!(submitted.session.status(), SessionStatus::InReview);
    assert_eq!(
        submitted.session.target(),
        ReviewTarget::Solution(submitted.solution.id())
    );
    let current = service.task(task.id()).await.expect("task readable");
    assert_eq!(current.status(), TaskStatus::SolutionReview);

    let log = service.change_log(task.id()).await.expect("log readable");
    let entry = log
        .iter()
        .find(|entry| entry.change_type() == ChangeType::SolutionSubmitted)
        .expect("submission logged");
    assert_eq!(entry.new_value(), Some("1"));
    assert!(
        entry
            .comment()
            .is_some_and(|text| text.contains("opened automatically"))
    );
}

#[rstest]
#[case(2)]
#[case(4)]
#[tokio::test(flavor = "multi_thread")]
async fn resubmitted_solutions_are_numbered_without_gaps(
    service: TestService,
    cast: Cast,
    #[case] rounds: u32,
) {
    let task = accepted_requirement(&service, &cast)
        .await
        .expect("task accepted");

    for round in 1..=rounds {
        let submitted = service
            .submit_solution(SubmitSolutionRequest::new(
                task.id(),
                cast.executor,
                format!("approach {round}"),
            ))
            .await
            .expect("solution submitted");
        assert_eq!(submitted.solution.version().value(), round);
        reject(&service, &cast, &submitted.session)
            .await
            .expect("creator rejects");
    }

    let solutions = service.solutions(task.id()).await.expect("solutions readable");
    let versions: Vec<u32> = solutions.iter().map(|s| s.version().value()).collect();
    assert_eq!(versions, (1..=rounds).collect::<Vec<_>>());
    assert!(
        solutions
            .iter()
            .all(|solution| solution.status() == ArtifactStatus::Rejected)
    );
    let current = service.task(task.id()).await.expect("task readable");
    assert_eq!(current.status(), TaskStatus::SolutionRejected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resubmission_opens_a_new_session_and_keeps_history(service: TestService, cast: Cast) {
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

    assert_eq!(second.solution.version().value(), 2);
    assert_ne!(second.solution.id(), first.solution.id());
    assert_ne!(second.session.id(), first.session.id());
    let old = service
        .review_session(first.session.id())
        .await
        .expect("old session readable");
    assert_eq!(old.status(), SessionStatus::Completed);
    let current = service.task(task.id()).await.expect("task readable");
    assert_eq!(current.status(), TaskStatus::SolutionReview);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plan_goals_are_numbered_in_submission_order(service: TestService, cast: Cast) {
    let (task, submitted) = requirement_in_plan_review(&service, &cast)
        .await
        .expect("plan submitted");

    let numbers: Vec<u32> = submitted.plan.goals().iter().map(|g| g.goal_no()).collect();
    assert_eq!(numbers, vec![1, 2]);
    let titles: Vec<&str> = submitted.plan.goals().iter().map(|g| g.title()).collect();
    assert_eq!(titles, vec!["Schema", "Loader"]);

    let plans = service
        .execution_plans(task.id())
        .await
        .expect("plans readable");
    assert_eq!(plans, vec![submitted.plan.clone()]);
    assert_eq!(
        submitted.session.target(),
        ReviewTarget::ExecutionPlan(submitted.plan.id())
    );
}

#[rstest]
#[case::no_goals(Vec::new())]
#[case::blank_title(vec![GoalDraft::new("  ", "Stream rows")])]
#[case::blank_description(vec![GoalDraft::new("Loader", "")])]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_goal_lists_are_rejected_before_storage(
    service: TestService,
    cast: Cast,
    #[case] goals: Vec<GoalDraft>,
) {
    let (task, solution) = requirement_in_solution_review(&service, &cast)
        .await
        .expect("solution submitted");
    approve(&service, &cast, &solution.session)
        .await
        .expect("creator approves");
    let log_before = service.change_log(task.id()).await.expect("log readable");

    let err = service
        .submit_execution_plan_with_goals(SubmitExecutionPlanRequest::new(
            task.id(),
            cast.executor,
            "plan",
            goals,
        ))
        .await
        .expect_err("goals refused");

    assert_eq!(err.kind(), WorkflowErrorKind::Validation);
    let log_after = service.change_log(task.id()).await.expect("log readable");
    assert_eq!(log_before, log_after);
    assert!(
        service
            .execution_plans(task.id())
            .await
            .expect("plans readable")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn plan_cannot_precede_solution_approval(service: TestService, cast: Cast) {
    let task = accepted_requirement(&service, &cast)
        .await
        .expect("task accepted");

    let err = service
        .submit_execution_plan_with_goals(SubmitExecutionPlanRequest::new(
            task.id(),
            cast.executor,
            "plan",
            sample_goals(),
        ))
        .await
        .expect_err("solution not yet approved");

    assert_eq!(err.kind(), WorkflowErrorKind::InvalidState);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_submissions_allocate_one_version(service: TestService, cast: Cast) {
    let task = accepted_requirement(&service, &cast)
        .await
        .expect("task accepted");

    let attempts: Vec<_> = (0..4)
        .map(|n| {
            let svc = service.clone();
            let request =
                SubmitSolutionRequest::new(task.id(), cast.executor, format!("racer {n}"));
            tokio::spawn(async move { svc.submit_solution(request).await })
        })
        .collect();
    let mut successes = 0;
    for attempt in attempts {
        if attempt.await.expect("task joined").is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    let solutions = service.solutions(task.id()).await.expect("solutions readable");
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0].version().value(), 1);
}
