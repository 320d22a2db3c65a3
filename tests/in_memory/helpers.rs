//! Shared fixtures and lifecycle shortcuts for in-memory workflow tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use stagegate::artifact::domain::GoalDraft;
use stagegate::review::domain::ReviewSession;
use stagegate::task::domain::{Task, TaskType, UserId};
use stagegate::transition::adapters::memory::StaticTransitionRuleStore;
use stagegate::workflow::{
    WorkflowService,
    adapters::memory::InMemoryWorkflowStore,
    services::{
        CreateTaskRequest, FinalizeReviewRequest, SubmitExecutionPlanRequest, SubmitSolutionRequest, SubmittedPlan,
        SubmittedSolution,
    },
};

/// Workflow service wired to in-memory adapters.
pub type TestService =
    WorkflowService<InMemoryWorkflowStore, StaticTransitionRuleStore, DefaultClock>;

/// Users taking part in a scenario.
#[derive(Debug, Clone, Copy)]
pub struct Cast {
    /// Creates tasks and decides reviews.
    pub creator: UserId,
    /// Does the work.
    pub executor: UserId,
    /// First jury candidate.
    pub juror: UserId,
    /// Second jury candidate.
    pub second_juror: UserId,
    /// Holds no role on any task.
    pub outsider: UserId,
}

/// Service and store sharing the same state.
pub struct Harness {
    /// Service under test.
    pub service: TestService,
    /// Store behind the service, for fault injection.
    pub store: Arc<InMemoryWorkflowStore>,
}

/// Provides a fresh cast of users.
#[fixture]
pub fn cast() -> Cast {
    Cast {
        creator: UserId::new(),
        executor: UserId::new(),
        juror: UserId::new(),
        second_juror: UserId::new(),
        outsider: UserId::new(),
    }
}

/// Provides a service over an empty in-memory store.
#[fixture]
pub fn harness() -> Harness {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let service = WorkflowService::new(
        Arc::clone(&store),
        Arc::new(StaticTransitionRuleStore::default()),
        Arc::new(DefaultClock),
    );
    Harness { service, store }
}

/// Provides a service when the store handle is not needed.
#[fixture]
pub fn service(harness: Harness) -> TestService {
    harness.service
}

/// Returns two goals with filled-in titles and descriptions.
#[must_use]
pub fn sample_goals() -> Vec<GoalDraft> {
    vec![
        GoalDraft::new("Schema", "Design the import tables"),
        GoalDraft::new("Loader", "Stream rows into the tables"),
    ]
}

/// Creates a requirement assigned to the cast's executor.
///
/// # Errors
///
/// Returns an error when the task cannot be created.
pub async fn assigned_requirement(service: &TestService, cast: &Cast) -> eyre::Result<Task> {
    Ok(service
        .create_task(
            CreateTaskRequest::new(TaskType::Requirement, "Import legacy orders", cast.creator)
                .with_executor(cast.executor),
        )
        .await?)
}

/// Creates a requirement and has the executor accept it.
///
/// # Errors
///
/// Returns an error when creation or acceptance fails.
pub async fn accepted_requirement(service: &TestService, cast: &Cast) -> eyre::Result<Task> {
    let task = assigned_requirement(service, cast).await?;
    Ok(service.accept_task(task.id(), cast.executor).await?)
}

/// Drives a requirement to `solution_review` with its first solution.
///
/// # Errors
///
/// Returns an error when any lifecycle step fails.
pub async fn requirement_in_solution_review(
    service: &TestService,
    cast: &Cast,
) -> eyre::Result<(Task, SubmittedSolution)> {
    let task = accepted_requirement(service, cast).await?;
    let submitted = service
        .submit_solution(SubmitSolutionRequest::new(
            task.id(),
            cast.executor,
            "approach A",
        ))
        .await?;
    Ok((task, submitted))
}

/// Drives a requirement to `plan_review` with its first plan.
///
/// # Errors
///
/// Returns an error when any lifecycle step fails.
pub async fn requirement_in_plan_review(
    service: &TestService,
    cast: &Cast,
) -> eyre::Result<(Task, SubmittedPlan)> {
    let (task, solution) = requirement_in_solution_review(service, cast).await?;
    approve(service, cast, &solution.session).await?;
    let submitted = service
        .submit_execution_plan_with_goals(SubmitExecutionPlanRequest::new(
            task.id(),
            cast.executor,
            "two phase import",
            sample_goals(),
        ))
        .await?;
    Ok((task, submitted))
}

/// Finalises `session` as approved by the creator.
///
/// # Errors
///
/// Returns an error when finalisation fails.
pub async fn approve(
    service: &TestService,
    cast: &Cast,
    session: &ReviewSession,
) -> eyre::Result<Task> {
    decide(service, cast, session, true).await
}

/// Finalises `session` as rejected by the creator.
///
/// # Errors
///
/// Returns an error when finalisation fails.
pub async fn reject(
    service: &TestService,
    cast: &Cast,
    session: &ReviewSession,
) -> eyre::Result<Task> {
    decide(service, cast, session, false).await
}

async fn decide(
    service: &TestService,
    cast: &Cast,
    session: &ReviewSession,
    approved: bool,
) -> eyre::Result<Task> {
    let finalized = service
        .finalize_review(FinalizeReviewRequest::new(
            session.id(),
            cast.creator,
            approved,
        ))
        .await?;
    Ok(finalized.task)
}
