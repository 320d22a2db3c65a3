//! Helpers shared by the workflow operations.

use crate::review::domain::{ReviewSession, ReviewSessionId};
use crate::task::domain::{
    ChangeType, ParticipantRole, RoleSet, Task, TaskChangeLog, TaskId, TaskParticipant, TaskRole,
    TaskStatus, UserId, derive_roles,
};
use crate::workflow::{
    error::{ValidationError, WorkflowError, WorkflowResult},
    ports::WorkflowTransaction,
};
use mockable::Clock;

/// Locks and returns the task.
pub(super) fn lock_task(
    tx: &mut dyn WorkflowTransaction,
    task_id: TaskId,
) -> WorkflowResult<Task> {
    tx.lock_task(task_id)?
        .ok_or(WorkflowError::TaskNotFound(task_id))
}

/// Locks the session's task, then reads the session again under the lock.
pub(super) fn lock_session(
    tx: &mut dyn WorkflowTransaction,
    session_id: ReviewSessionId,
) -> WorkflowResult<(ReviewSession, Task)> {
    let task_id = find_session(tx, session_id)?.task_id();
    let task = lock_task(tx, task_id)?;
    let session = find_session(tx, session_id)?;
    Ok((session, task))
}

fn find_session(
    tx: &mut dyn WorkflowTransaction,
    session_id: ReviewSessionId,
) -> WorkflowResult<ReviewSession> {
    tx.find_session(session_id)?
        .ok_or(WorkflowError::SessionNotFound(session_id))
}

/// Derives the actor's roles from the task and its participant rows.
pub(super) fn actor_roles(
    tx: &mut dyn WorkflowTransaction,
    task: &Task,
    actor: UserId,
) -> WorkflowResult<RoleSet> {
    let participants = tx.participants(task.id())?;
    Ok(derive_roles(task, &participants, actor))
}

pub(super) fn require_creator(
    task: &Task,
    actor: UserId,
    action: &'static str,
) -> WorkflowResult<()> {
    if task.is_creator(actor) {
        Ok(())
    } else {
        Err(WorkflowError::Unauthorized {
            actor,
            action,
            required: TaskRole::Creator,
        })
    }
}

pub(super) fn require_executor(
    task: &Task,
    actor: UserId,
    action: &'static str,
) -> WorkflowResult<()> {
    if task.is_executor(actor) {
        Ok(())
    } else {
        Err(WorkflowError::Unauthorized {
            actor,
            action,
            required: TaskRole::Executor,
        })
    }
}

/// Builds the change-log entry for a status move.
pub(super) fn status_entry(
    task: &Task,
    actor: UserId,
    from: TaskStatus,
    clock: &impl Clock,
) -> TaskChangeLog {
    TaskChangeLog::new(task.id(), actor, ChangeType::StatusChange, clock).with_field(
        "status",
        Some(from.as_str()),
        Some(task.status().as_str()),
    )
}

/// Creates or re-opens a participant invitation.
///
/// An active jury row is left alone, so repeated invitations are harmless.
/// Returns `true` when a row was written.
pub(super) fn invite_participant(
    tx: &mut dyn WorkflowTransaction,
    task_id: TaskId,
    user_id: UserId,
    role: ParticipantRole,
    invited_by: UserId,
    clock: &impl Clock,
) -> WorkflowResult<bool> {
    let existing = tx
        .participants(task_id)?
        .into_iter()
        .find(|row| row.user_id() == user_id && row.role() == role);

    match existing {
        Some(row) if role == ParticipantRole::Jury && row.is_active() => Ok(false),
        Some(mut row) => {
            row.reinvite(invited_by, clock);
            tx.update_participant(&row)?;
            Ok(true)
        }
        None => {
            let row = TaskParticipant::invite(task_id, user_id, role, invited_by, clock);
            tx.insert_participant(&row)?;
            Ok(true)
        }
    }
}

/// Checks a required text field.
pub(super) fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    bounded_text(field, Some(value), max)
}

/// Checks the length of an optional text field.
pub(super) fn bounded_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        _ => Ok(()),
    }
}

/// Logs a refused or failed operation.
pub(super) fn log_failure(operation: &'static str, err: &WorkflowError) {
    tracing::debug!(operation, kind = %err.kind(), error = %err, "workflow operation refused");
}
