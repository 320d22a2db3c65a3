//! Artifact submissions: solutions and execution plans with goals.

use super::{
    SubmitExecutionPlanRequest, SubmitSolutionRequest, SubmittedPlan, SubmittedSolution,
    WorkflowService,
    support::{
        actor_roles, bounded_text, lock_task, log_failure, require_executor, required_text,
        status_entry,
    },
};
use crate::artifact::domain::{ArtifactVersion, ExecutionPlan, Solution, validate_goals};
use crate::review::domain::{
    ReviewMode, ReviewSession, ReviewSessionDraft, ReviewTarget, ReviewType,
};
use crate::task::domain::{ChangeType, Task, TaskChangeLog, TaskStatus, UserId};
use crate::transition::{domain::TransitionTable, ports::TransitionRuleStore};
use crate::workflow::{
    error::{WorkflowError, WorkflowResult},
    ports::{WorkflowStore, WorkflowTransaction},
};
use mockable::Clock;
use std::sync::Arc;

impl<S, R, C> WorkflowService<S, R, C>
where
    S: WorkflowStore,
    R: TransitionRuleStore,
    C: Clock + Send + Sync + 'static,
{
    /// Submits the next solution version and opens its review.
    ///
    /// The version is one above the task's highest solution version. The
    /// task moves to `solution_review` and a single-mode session targeting
    /// the new version is opened.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Validation`] for blank or oversized content,
    /// [`WorkflowError::Unauthorized`] when the actor is not the executor
    /// and [`WorkflowError::UnexpectedStatus`] unless the task is
    /// `pending_solution` or `solution_rejected`.
    pub async fn submit_solution(
        &self,
        request: SubmitSolutionRequest,
    ) -> WorkflowResult<SubmittedSolution> {
        required_text("content", &request.content, self.config.max_text_length)?;
        bounded_text(
            "mindmap_ref",
            request.mindmap_ref.as_deref(),
            self.config.max_text_length,
        )?;
        let SubmitSolutionRequest {
            task_id,
            actor,
            content,
            mindmap_ref,
        } = request;

        let table = self.table_for_task(task_id).await?;
        let clock = Arc::clone(&self.clock);
        let required_approvals = self.config.default_required_approvals;
        let submitted = self
            .run(move |tx| {
                let mut task = lock_task(tx, task_id)?;
                let from = begin_submission(
                    tx,
                    &task,
                    actor,
                    &table,
                    "submit a solution",
                    &[TaskStatus::PendingSolution, TaskStatus::SolutionRejected],
                    TaskStatus::SolutionReview,
                )?;

                let version = ArtifactVersion::next_after(tx.latest_solution_version(task_id)?)?;
                let solution = Solution::submit(task_id, version, content, actor, &*clock)?
                    .with_mindmap_ref(mindmap_ref);
                tx.insert_solution(&solution)?;

                task.move_to(TaskStatus::SolutionReview, &*clock)?;
                tx.update_task(&task)?;
                let session = open_submission_review(
                    tx,
                    &task,
                    actor,
                    ReviewType::SolutionReview,
                    ReviewTarget::Solution(solution.id()),
                    required_approvals,
                    &*clock,
                )?;

                tx.append_change_log(
                    &TaskChangeLog::new(task_id, actor, ChangeType::SolutionSubmitted, &*clock)
                        .with_field(
                            "solution_version",
                            None,
                            Some(version.value().to_string().as_str()),
                        )
                        .with_comment(format!(
                            "review session {} opened automatically",
                            session.id()
                        )),
                )?;
                tx.append_change_log(&status_entry(&task, actor, from, &*clock))?;
                Ok(SubmittedSolution { solution, session })
            })
            .await
            .inspect_err(|err| log_failure("submit_solution", err))?;

        tracing::info!(
            task_id = %task_id,
            actor = %actor,
            version = submitted.solution.version().value(),
            session_id = %submitted.session.id(),
            "solution submitted"
        );
        Ok(submitted)
    }

    /// Submits the next execution plan version with its goals and opens its
    /// review.
    ///
    /// Goals are numbered from 1 in the order given. The task moves to
    /// `plan_review` and a single-mode session targeting the new plan is
    /// opened.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Artifact`] for an empty or incomplete goal
    /// list before storage is touched, [`WorkflowError::Unauthorized`] when
    /// the actor is not the executor and [`WorkflowError::UnexpectedStatus`]
    /// unless the task is `pending_plan` or `plan_rejected`.
    pub async fn submit_execution_plan_with_goals(
        &self,
        request: SubmitExecutionPlanRequest,
    ) -> WorkflowResult<SubmittedPlan> {
        let max_text = self.config.max_text_length;
        required_text("content", &request.content, max_text)?;
        bounded_text("attachment_ref", request.attachment_ref.as_deref(), max_text)?;
        validate_goals(&request.goals, self.config.max_goals_per_plan)?;
        for goal in &request.goals {
            bounded_text("goal title", Some(goal.title.as_str()), max_text)?;
            bounded_text("goal description", Some(goal.description.as_str()), max_text)?;
            bounded_text(
                "goal acceptance criteria",
                goal.acceptance_criteria.as_deref(),
                max_text,
            )?;
        }
        let SubmitExecutionPlanRequest {
            task_id,
            actor,
            content,
            attachment_ref,
            goals,
        } = request;

        let table = self.table_for_task(task_id).await?;
        let clock = Arc::clone(&self.clock);
        let max_goals = self.config.max_goals_per_plan;
        let required_approvals = self.config.default_required_approvals;
        let submitted = self
            .run(move |tx| {
                let mut task = lock_task(tx, task_id)?;
                let from = begin_submission(
                    tx,
                    &task,
                    actor,
                    &table,
                    "submit an execution plan",
                    &[TaskStatus::PendingPlan, TaskStatus::PlanRejected],
                    TaskStatus::PlanReview,
                )?;

                let version = ArtifactVersion::next_after(tx.latest_plan_version(task_id)?)?;
                let plan = ExecutionPlan::submit(
                    task_id, version, content, goals, max_goals, actor, &*clock,
                )?
                .with_attachment_ref(attachment_ref);
                tx.insert_plan(&plan)?;

                task.move_to(TaskStatus::PlanReview, &*clock)?;
                tx.update_task(&task)?;
                let session = open_submission_review(
                    tx,
                    &task,
                    actor,
                    ReviewType::ExecutionPlanReview,
                    ReviewTarget::ExecutionPlan(plan.id()),
                    required_approvals,
                    &*clock,
                )?;

                tx.append_change_log(
                    &TaskChangeLog::new(task_id, actor, ChangeType::PlanSubmitted, &*clock)
                        .with_field(
                            "plan_version",
                            None,
                            Some(version.value().to_string().as_str()),
                        )
                        .with_comment(format!(
                            "{} goals; review session {} opened automatically",
                            plan.goals().len(),
                            session.id()
                        )),
                )?;
                tx.append_change_log(&status_entry(&task, actor, from, &*clock))?;
                Ok(SubmittedPlan { plan, session })
            })
            .await
            .inspect_err(|err| log_failure("submit_execution_plan_with_goals", err))?;

        tracing::info!(
            task_id = %task_id,
            actor = %actor,
            version = submitted.plan.version().value(),
            goals = submitted.plan.goals().len(),
            session_id = %submitted.session.id(),
            "execution plan submitted"
        );
        Ok(submitted)
    }
}

/// Checks who may submit and from where; returns the status being left.
fn begin_submission(
    tx: &mut dyn WorkflowTransaction,
    task: &Task,
    actor: UserId,
    table: &TransitionTable,
    action: &'static str,
    accepted_from: &[TaskStatus],
    to: TaskStatus,
) -> WorkflowResult<TaskStatus> {
    require_executor(task, actor, action)?;
    let from = task.status();
    if !accepted_from.contains(&from) {
        return Err(WorkflowError::UnexpectedStatus {
            task_id: task.id(),
            action,
            status: from,
        });
    }
    let roles = actor_roles(tx, task, actor)?;
    table.validate(from, to, &roles)?;
    Ok(from)
}

fn open_submission_review(
    tx: &mut dyn WorkflowTransaction,
    task: &Task,
    actor: UserId,
    review_type: ReviewType,
    target: ReviewTarget,
    required_approvals: u32,
    clock: &impl Clock,
) -> WorkflowResult<ReviewSession> {
    let session = ReviewSession::open(
        ReviewSessionDraft {
            task_id: task.id(),
            review_type,
            target,
            mode: ReviewMode::Single,
            required_approvals,
            initiated_by: actor,
        },
        clock,
    )?;
    tx.insert_session(&session)?;
    tx.append_change_log(
        &TaskChangeLog::new(task.id(), actor, ChangeType::ReviewInitiated, clock)
            .with_field(
                "review_session",
                None,
                Some(session.id().to_string().as_str()),
            )
            .with_comment(format!("{review_type} ({})", session.mode())),
    )?;
    Ok(session)
}
