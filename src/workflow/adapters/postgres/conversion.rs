//! Mapping between Diesel rows and domain values.

use super::models::{
    ChangeLogRow, GoalRow, NewChangeLogRow, ParticipantRow, PlanRow, RecordRow, SessionRow,
    SolutionRow, TaskRow,
};
use crate::artifact::domain::{
    ArtifactStatus, ArtifactVersion, ExecutionPlan, Goal, GoalId, GoalStatus, PersistedGoalData,
    PersistedPlanData, PersistedSolutionData, PlanId, Solution, SolutionId,
};
use crate::review::domain::{
    Opinion, PersistedRecordData, PersistedSessionData, ReviewDecision, ReviewMode, ReviewRecord,
    ReviewRecordId, ReviewSession, ReviewSessionId, ReviewTarget, ReviewType, ReviewerRole,
    SessionStatus, TargetKind, VoteWeight,
};
use crate::task::domain::{
    ChangeLogId, ChangeType, ParticipantRole, ParticipantStatus, PersistedChangeLogData,
    PersistedParticipantData, PersistedTaskData, Priority, Task, TaskChangeLog, TaskId,
    TaskParticipant, TaskStatus, TaskType, UserId,
};
use crate::workflow::ports::{WorkflowStoreError, WorkflowStoreResult};
use thiserror::Error;
use uuid::Uuid;

/// A stored row that no longer maps onto a valid domain value.
#[derive(Debug, Clone, Error)]
#[error("malformed {table} row {id}: {reason}")]
pub struct MalformedRow {
    table: &'static str,
    id: Uuid,
    reason: String,
}

fn malformed(table: &'static str, id: Uuid) -> impl Fn(String) -> WorkflowStoreError {
    move |reason| WorkflowStoreError::persistence(MalformedRow { table, id, reason })
}

/// Parses a stored code column.
fn code<T, E>(
    raw: &str,
    fail: &impl Fn(String) -> WorkflowStoreError,
) -> WorkflowStoreResult<T>
where
    T: for<'a> TryFrom<&'a str, Error = E>,
    E: std::fmt::Display,
{
    T::try_from(raw).map_err(|err| fail(err.to_string()))
}

fn count_to_column(value: u32, what: &str) -> WorkflowStoreResult<i32> {
    i32::try_from(value).map_err(|_| {
        WorkflowStoreError::persistence(std::io::Error::other(format!(
            "{what} {value} exceeds the storage range"
        )))
    })
}

pub(super) fn task_to_row(task: &Task) -> WorkflowStoreResult<TaskRow> {
    Ok(TaskRow {
        id: task.id().into_inner(),
        task_type: task.task_type().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        title: task.title().to_owned(),
        creator_id: task.creator_id().into_inner(),
        executor_id: task.executor_id().map(UserId::into_inner),
        parent_id: task.parent_id().map(TaskId::into_inner),
        root_id: task.root_id().map(TaskId::into_inner),
        priority: task.priority().as_str().to_owned(),
        solution_deadline_days: task
            .solution_deadline_days()
            .map(|days| count_to_column(days, "solution deadline"))
            .transpose()?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

pub(super) fn row_to_task(row: TaskRow) -> WorkflowStoreResult<Task> {
    let fail = malformed("tasks", row.id);
    let solution_deadline_days = row
        .solution_deadline_days
        .map(|days| u32::try_from(days).map_err(|err| fail(err.to_string())))
        .transpose()?;
    Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        task_type: code::<TaskType, _>(&row.task_type, &fail)?,
        status: code::<TaskStatus, _>(&row.status, &fail)?,
        title: row.title,
        creator_id: UserId::from_uuid(row.creator_id),
        executor_id: row.executor_id.map(UserId::from_uuid),
        parent_id: row.parent_id.map(TaskId::from_uuid),
        root_id: row.root_id.map(TaskId::from_uuid),
        priority: code::<Priority, _>(&row.priority, &fail)?,
        solution_deadline_days,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
    .map_err(|err| fail(err.to_string()))
}

pub(super) fn participant_to_row(participant: &TaskParticipant) -> ParticipantRow {
    ParticipantRow {
        task_id: participant.task_id().into_inner(),
        user_id: participant.user_id().into_inner(),
        role: participant.role().as_str().to_owned(),
        status: participant.status().as_str().to_owned(),
        invited_by: participant.invited_by().into_inner(),
        invited_at: participant.invited_at(),
    }
}

pub(super) fn row_to_participant(row: ParticipantRow) -> WorkflowStoreResult<TaskParticipant> {
    let fail = malformed("task_participants", row.user_id);
    Ok(TaskParticipant::from_persisted(PersistedParticipantData {
        task_id: TaskId::from_uuid(row.task_id),
        user_id: UserId::from_uuid(row.user_id),
        role: code::<ParticipantRole, _>(&row.role, &fail)?,
        status: code::<ParticipantStatus, _>(&row.status, &fail)?,
        invited_by: UserId::from_uuid(row.invited_by),
        invited_at: row.invited_at,
    }))
}

fn version_from_column(
    value: i32,
    fail: &impl Fn(String) -> WorkflowStoreError,
) -> WorkflowStoreResult<ArtifactVersion> {
    ArtifactVersion::from_stored(value).map_err(|err| fail(err.to_string()))
}

pub(super) fn solution_to_row(solution: &Solution) -> WorkflowStoreResult<SolutionRow> {
    Ok(SolutionRow {
        id: solution.id().into_inner(),
        task_id: solution.task_id().into_inner(),
        version: count_to_column(solution.version().value(), "solution version")?,
        content: solution.content().to_owned(),
        mindmap_ref: solution.mindmap_ref().map(str::to_owned),
        status: solution.status().as_str().to_owned(),
        submitted_by: solution.submitted_by().into_inner(),
        submitted_at: solution.submitted_at(),
    })
}

pub(super) fn row_to_solution(row: SolutionRow) -> WorkflowStoreResult<Solution> {
    let fail = malformed("solutions", row.id);
    Ok(Solution::from_persisted(PersistedSolutionData {
        id: SolutionId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        version: version_from_column(row.version, &fail)?,
        content: row.content,
        mindmap_ref: row.mindmap_ref,
        status: code::<ArtifactStatus, _>(&row.status, &fail)?,
        submitted_by: UserId::from_uuid(row.submitted_by),
        submitted_at: row.submitted_at,
    }))
}

pub(super) fn plan_to_rows(plan: &ExecutionPlan) -> WorkflowStoreResult<(PlanRow, Vec<GoalRow>)> {
    let row = PlanRow {
        id: plan.id().into_inner(),
        task_id: plan.task_id().into_inner(),
        version: count_to_column(plan.version().value(), "plan version")?,
        content: plan.content().to_owned(),
        attachment_ref: plan.attachment_ref().map(str::to_owned),
        status: plan.status().as_str().to_owned(),
        submitted_by: plan.submitted_by().into_inner(),
        submitted_at: plan.submitted_at(),
    };
    let goals = plan
        .goals()
        .iter()
        .map(|goal| {
            Ok(GoalRow {
                id: goal.id().into_inner(),
                plan_id: goal.plan_id().into_inner(),
                goal_no: count_to_column(goal.goal_no(), "goal number")?,
                title: goal.title().to_owned(),
                description: goal.description().to_owned(),
                acceptance_criteria: goal.acceptance_criteria().map(str::to_owned),
                priority: goal.priority().as_str().to_owned(),
                status: goal.status().as_str().to_owned(),
            })
        })
        .collect::<WorkflowStoreResult<Vec<_>>>()?;
    Ok((row, goals))
}

pub(super) fn row_to_goal(row: GoalRow) -> WorkflowStoreResult<Goal> {
    let fail = malformed("goals", row.id);
    Ok(Goal::from_persisted(PersistedGoalData {
        id: GoalId::from_uuid(row.id),
        plan_id: PlanId::from_uuid(row.plan_id),
        goal_no: u32::try_from(row.goal_no).map_err(|err| fail(err.to_string()))?,
        title: row.title,
        description: row.description,
        acceptance_criteria: row.acceptance_criteria,
        priority: code::<Priority, _>(&row.priority, &fail)?,
        status: code::<GoalStatus, _>(&row.status, &fail)?,
    }))
}

/// Rebuilds a plan from its row and its goal rows, ordered by ordinal.
pub(super) fn rows_to_plan(
    row: PlanRow,
    goal_rows: Vec<GoalRow>,
) -> WorkflowStoreResult<ExecutionPlan> {
    let fail = malformed("execution_plans", row.id);
    let goals = goal_rows
        .into_iter()
        .map(row_to_goal)
        .collect::<WorkflowStoreResult<Vec<_>>>()?;
    Ok(ExecutionPlan::from_persisted(PersistedPlanData {
        id: PlanId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        version: version_from_column(row.version, &fail)?,
        content: row.content,
        attachment_ref: row.attachment_ref,
        status: code::<ArtifactStatus, _>(&row.status, &fail)?,
        submitted_by: UserId::from_uuid(row.submitted_by),
        submitted_at: row.submitted_at,
        goals,
    }))
}

pub(super) fn session_to_row(session: &ReviewSession) -> WorkflowStoreResult<SessionRow> {
    Ok(SessionRow {
        id: session.id().into_inner(),
        task_id: session.task_id().into_inner(),
        review_type: session.review_type().as_str().to_owned(),
        target_type: session.target().kind().as_str().to_owned(),
        target_id: session.target().id(),
        review_mode: session.mode().as_str().to_owned(),
        required_approvals: count_to_column(session.required_approvals(), "required approvals")?,
        status: session.status().as_str().to_owned(),
        initiated_by: session.initiated_by().into_inner(),
        initiated_at: session.initiated_at(),
        final_decision: session
            .final_decision()
            .map(|decision| decision.as_str().to_owned()),
        decided_by: session.decided_by().map(UserId::into_inner),
        decided_at: session.decided_at(),
        decision_comment: session.decision_comment().map(str::to_owned),
        completed_at: session.completed_at(),
    })
}

pub(super) fn row_to_session(row: SessionRow) -> WorkflowStoreResult<ReviewSession> {
    let fail = malformed("review_sessions", row.id);
    let kind = code::<TargetKind, _>(&row.target_type, &fail)?;
    Ok(ReviewSession::from_persisted(PersistedSessionData {
        id: ReviewSessionId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        review_type: code::<ReviewType, _>(&row.review_type, &fail)?,
        target: ReviewTarget::from_parts(kind, row.target_id),
        mode: code::<ReviewMode, _>(&row.review_mode, &fail)?,
        required_approvals: u32::try_from(row.required_approvals)
            .map_err(|err| fail(err.to_string()))?,
        status: code::<SessionStatus, _>(&row.status, &fail)?,
        initiated_by: UserId::from_uuid(row.initiated_by),
        initiated_at: row.initiated_at,
        final_decision: row
            .final_decision
            .as_deref()
            .map(|raw| code::<ReviewDecision, _>(raw, &fail))
            .transpose()?,
        decided_by: row.decided_by.map(UserId::from_uuid),
        decided_at: row.decided_at,
        decision_comment: row.decision_comment,
        completed_at: row.completed_at,
    }))
}

pub(super) fn record_to_row(record: &ReviewRecord) -> RecordRow {
    RecordRow {
        id: record.id().into_inner(),
        session_id: record.session_id().into_inner(),
        reviewer_id: record.reviewer_id().into_inner(),
        reviewer_role: record.reviewer_role().as_str().to_owned(),
        opinion: record.opinion().as_str().to_owned(),
        score: record.score().map(i16::from),
        weight: record.weight().value(),
        comment: record.comment().map(str::to_owned),
        created_at: record.created_at(),
    }
}

pub(super) fn row_to_record(row: RecordRow) -> WorkflowStoreResult<ReviewRecord> {
    let fail = malformed("review_records", row.id);
    let score = row
        .score
        .map(|value| u8::try_from(value).map_err(|err| fail(err.to_string())))
        .transpose()?;
    Ok(ReviewRecord::from_persisted(PersistedRecordData {
        id: ReviewRecordId::from_uuid(row.id),
        session_id: ReviewSessionId::from_uuid(row.session_id),
        reviewer_id: UserId::from_uuid(row.reviewer_id),
        reviewer_role: code::<ReviewerRole, _>(&row.reviewer_role, &fail)?,
        opinion: code::<Opinion, _>(&row.opinion, &fail)?,
        score,
        weight: VoteWeight::from_stored(row.weight),
        comment: row.comment,
        created_at: row.created_at,
    }))
}

pub(super) fn change_log_to_row(entry: &TaskChangeLog) -> NewChangeLogRow {
    NewChangeLogRow {
        id: entry.id().into_inner(),
        task_id: entry.task_id().into_inner(),
        actor_id: entry.actor_id().into_inner(),
        change_type: entry.change_type().as_str().to_owned(),
        field_name: entry.field_name().map(str::to_owned),
        old_value: entry.old_value().map(str::to_owned),
        new_value: entry.new_value().map(str::to_owned),
        comment: entry.comment().map(str::to_owned),
        created_at: entry.created_at(),
    }
}

pub(super) fn row_to_change_log(row: ChangeLogRow) -> WorkflowStoreResult<TaskChangeLog> {
    let fail = malformed("task_change_logs", row.id);
    Ok(TaskChangeLog::from_persisted(PersistedChangeLogData {
        id: ChangeLogId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        actor_id: UserId::from_uuid(row.actor_id),
        change_type: code::<ChangeType, _>(&row.change_type, &fail)?,
        field_name: row.field_name,
        old_value: row.old_value,
        new_value: row.new_value,
        comment: row.comment,
        created_at: row.created_at,
    }))
}
