//! Task registration, assignment, acceptance and plain status moves.

use super::{
    CreateTaskRequest, WorkflowService,
    support::{
        actor_roles, bounded_text, invite_participant, lock_task, log_failure, require_executor,
        required_text, status_entry,
    },
};
use crate::task::domain::{
    ChangeType, ParticipantRole, ParticipantStatus, Task, TaskChangeLog, TaskId, TaskParticipant,
    TaskStatus, UserId,
};
use crate::transition::ports::TransitionRuleStore;
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
    /// Registers a task.
    ///
    /// The task starts in `pending_accept` with a pending executor
    /// participant row when an executor is named, and in `unassigned`
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Validation`] or [`WorkflowError::Task`] for
    /// invalid input and [`WorkflowError::Store`] when storage fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> WorkflowResult<Task> {
        bounded_text(
            "title",
            Some(request.draft.title.as_str()),
            self.config.max_text_length,
        )?;
        let task = Task::new(request.draft, &*self.clock)?;

        let clock = Arc::clone(&self.clock);
        let created = task.clone();
        self.run(move |tx| {
            tx.insert_task(&task)?;
            if let Some(executor) = task.executor_id() {
                invite_participant(
                    tx,
                    task.id(),
                    executor,
                    ParticipantRole::Executor,
                    task.creator_id(),
                    &*clock,
                )?;
            }
            tx.append_change_log(
                &TaskChangeLog::new(task.id(), task.creator_id(), ChangeType::Created, &*clock)
                    .with_field("status", None, Some(task.status().as_str()))
                    .with_comment(task.title()),
            )?;
            Ok(())
        })
        .await
        .inspect_err(|err| log_failure("create_task", err))?;

        tracing::info!(
            task_id = %created.id(),
            task_type = %created.task_type(),
            status = %created.status(),
            "task created"
        );
        Ok(created)
    }

    /// Assigns an executor and moves the task to `pending_accept`.
    ///
    /// Allowed from whichever statuses the rule table opens towards
    /// `pending_accept` (`unassigned`, and `declined` for requirements).
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Transition`] when the edge is missing or
    /// closed to the actor and [`WorkflowError::Task`] when the executor is
    /// the creator.
    pub async fn assign_executor(
        &self,
        task_id: TaskId,
        actor: UserId,
        executor: UserId,
    ) -> WorkflowResult<Task> {
        let table = self.table_for_task(task_id).await?;
        let clock = Arc::clone(&self.clock);
        let task = self
            .run(move |tx| {
                let mut task = lock_task(tx, task_id)?;
                let roles = actor_roles(tx, &task, actor)?;
                let from = task.status();
                table.validate(from, TaskStatus::PendingAccept, &roles)?;

                let previous = task.executor_id();
                task.assign_executor(executor, &*clock)?;
                if let Some(old) = previous
                    && old != executor
                {
                    tx.delete_participant(task_id, old, ParticipantRole::Executor)?;
                }
                invite_participant(
                    tx,
                    task_id,
                    executor,
                    ParticipantRole::Executor,
                    actor,
                    &*clock,
                )?;
                task.move_to(TaskStatus::PendingAccept, &*clock)?;
                tx.update_task(&task)?;

                let previous_id = previous.map(|id| id.to_string());
                tx.append_change_log(
                    &TaskChangeLog::new(task_id, actor, ChangeType::FieldUpdate, &*clock)
                        .with_field(
                            "executor_id",
                            previous_id.as_deref(),
                            Some(executor.to_string().as_str()),
                        ),
                )?;
                tx.append_change_log(&status_entry(&task, actor, from, &*clock))?;
                Ok(task)
            })
            .await
            .inspect_err(|err| log_failure("assign_executor", err))?;

        tracing::info!(task_id = %task_id, actor = %actor, executor = %executor, "executor assigned");
        Ok(task)
    }

    /// Accepts the assignment on behalf of the executor.
    ///
    /// Requirements move to `pending_solution`, unit tasks to
    /// `pending_start`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Unauthorized`] when the actor is not the
    /// executor and [`WorkflowError::Transition`] when the current status has
    /// no accept edge.
    pub async fn accept_task(&self, task_id: TaskId, actor: UserId) -> WorkflowResult<Task> {
        let table = self.table_for_task(task_id).await?;
        let clock = Arc::clone(&self.clock);
        let task = self
            .run(move |tx| {
                let mut task = lock_task(tx, task_id)?;
                require_executor(&task, actor, "accept")?;
                let roles = actor_roles(tx, &task, actor)?;
                let from = task.status();
                let to = task.task_type().accept_status();
                table.validate(from, to, &roles)?;

                task.move_to(to, &*clock)?;
                tx.update_task(&task)?;
                answer_executor_invitation(tx, &task, actor, ParticipantStatus::Accepted, &*clock)?;
                tx.append_change_log(&status_entry(&task, actor, from, &*clock))?;
                Ok(task)
            })
            .await
            .inspect_err(|err| log_failure("accept_task", err))?;

        tracing::info!(task_id = %task_id, actor = %actor, status = %task.status(), "task accepted");
        Ok(task)
    }

    /// Turns the assignment down on behalf of the executor.
    ///
    /// Requirements move to `declined` and keep their executor until the
    /// creator reassigns. Unit tasks return to `unassigned` and lose their
    /// executor.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Validation`] for a blank reason,
    /// [`WorkflowError::Unauthorized`] when the actor is not the executor
    /// and [`WorkflowError::Transition`] when the current status has no
    /// reject edge.
    pub async fn reject_task(
        &self,
        task_id: TaskId,
        actor: UserId,
        reason: impl Into<String>,
    ) -> WorkflowResult<Task> {
        let reason_text: String = reason.into();
        required_text("reason", &reason_text, self.config.max_text_length)?;
        let table = self.table_for_task(task_id).await?;
        let clock = Arc::clone(&self.clock);
        let task = self
            .run(move |tx| {
                let mut task = lock_task(tx, task_id)?;
                require_executor(&task, actor, "reject")?;
                let roles = actor_roles(tx, &task, actor)?;
                let from = task.status();
                let to = task.task_type().reject_status();
                table.validate(from, to, &roles)?;

                answer_executor_invitation(tx, &task, actor, ParticipantStatus::Rejected, &*clock)?;
                task.move_to(to, &*clock)?;
                if task.task_type().releases_executor_on_reject() {
                    task.clear_executor(&*clock);
                }
                tx.update_task(&task)?;
                tx.append_change_log(
                    &status_entry(&task, actor, from, &*clock).with_comment(reason_text),
                )?;
                Ok(task)
            })
            .await
            .inspect_err(|err| log_failure("reject_task", err))?;

        tracing::info!(task_id = %task_id, actor = %actor, status = %task.status(), "task rejected");
        Ok(task)
    }

    /// Moves a task along a rule edge that has no dedicated operation, such
    /// as starting, completing or cancelling work.
    ///
    /// Entering a terminal status cancels every session still in review.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::DedicatedActionRequired`] for edges owned by
    /// another operation (assignment, acceptance, submissions, review
    /// decisions) and [`WorkflowError::Transition`] when the rule table
    /// refuses the move.
    pub async fn transition_task(
        &self,
        task_id: TaskId,
        actor: UserId,
        to: TaskStatus,
        comment: Option<String>,
    ) -> WorkflowResult<Task> {
        bounded_text("comment", comment.as_deref(), self.config.max_text_length)?;
        let table = self.table_for_task(task_id).await?;
        let clock = Arc::clone(&self.clock);
        let task = self
            .run(move |tx| {
                let mut task = lock_task(tx, task_id)?;
                let from = task.status();
                if is_dedicated_edge(&task, to) {
                    return Err(WorkflowError::DedicatedActionRequired { task_id, from, to });
                }
                let roles = actor_roles(tx, &task, actor)?;
                if table.validate(from, to, &roles)?.requires_approval() {
                    return Err(WorkflowError::DedicatedActionRequired { task_id, from, to });
                }

                task.move_to(to, &*clock)?;
                tx.update_task(&task)?;
                if to.is_terminal() {
                    close_open_sessions(tx, &task, actor, &*clock)?;
                }
                let mut entry = status_entry(&task, actor, from, &*clock);
                if let Some(text) = comment {
                    entry = entry.with_comment(text);
                }
                tx.append_change_log(&entry)?;
                Ok(task)
            })
            .await
            .inspect_err(|err| log_failure("transition_task", err))?;

        tracing::info!(task_id = %task_id, actor = %actor, status = %task.status(), "task status changed");
        Ok(task)
    }
}

/// Returns `true` when moving `task` to `to` belongs to a dedicated
/// operation rather than [`WorkflowService::transition_task`].
fn is_dedicated_edge(task: &Task, to: TaskStatus) -> bool {
    let task_type = task.task_type();
    to.is_action_gated()
        || (task.status() == TaskStatus::PendingAccept
            && (to == task_type.accept_status() || to == task_type.reject_status()))
}

fn answer_executor_invitation(
    tx: &mut dyn WorkflowTransaction,
    task: &Task,
    executor: UserId,
    answer: ParticipantStatus,
    clock: &impl Clock,
) -> WorkflowResult<()> {
    let existing = tx
        .participants(task.id())?
        .into_iter()
        .find(|row| row.user_id() == executor && row.role() == ParticipantRole::Executor);
    match existing {
        Some(mut row) => {
            row.respond(answer);
            tx.update_participant(&row)?;
        }
        None => {
            let mut row = TaskParticipant::invite(
                task.id(),
                executor,
                ParticipantRole::Executor,
                task.creator_id(),
                clock,
            );
            row.respond(answer);
            tx.insert_participant(&row)?;
        }
    }
    Ok(())
}

/// Cancels every session of the task that is still in review.
fn close_open_sessions(
    tx: &mut dyn WorkflowTransaction,
    task: &Task,
    actor: UserId,
    clock: &impl Clock,
) -> WorkflowResult<()> {
    for mut session in tx.sessions(task.id())? {
        if !session.is_open() {
            continue;
        }
        session.cancel(
            actor,
            Some(format!("task moved to {}", task.status())),
            clock,
        )?;
        tx.update_session(&session)?;
        tx.append_change_log(
            &TaskChangeLog::new(task.id(), actor, ChangeType::ReviewCancelled, clock).with_field(
                "review_session",
                Some(session.id().to_string().as_str()),
                Some(session.status().as_str()),
            ),
        )?;
    }
    Ok(())
}
