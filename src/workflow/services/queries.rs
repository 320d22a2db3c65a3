//! Read-only views over tasks, artifacts, sessions and the audit log.

use super::{WorkflowService, support::actor_roles};
use crate::artifact::domain::{ExecutionPlan, Solution};
use crate::review::domain::{ReviewRecord, ReviewSession, ReviewSessionId, ReviewTally};
use crate::task::domain::{
    RoleSet, Task, TaskChangeLog, TaskId, TaskParticipant, TaskStatus, UserId,
};
use crate::transition::ports::TransitionRuleStore;
use crate::workflow::{
    error::{WorkflowError, WorkflowResult},
    ports::{WorkflowStore, WorkflowTransaction},
};
use mockable::Clock;

impl<S, R, C> WorkflowService<S, R, C>
where
    S: WorkflowStore,
    R: TransitionRuleStore,
    C: Clock + Send + Sync + 'static,
{
    /// Returns the task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskNotFound`] when the task does not exist.
    pub async fn task(&self, task_id: TaskId) -> WorkflowResult<Task> {
        self.run(move |tx| existing_task(tx, task_id)).await
    }

    /// Returns the roles `actor` currently holds on the task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskNotFound`] when the task does not exist.
    pub async fn roles(&self, task_id: TaskId, actor: UserId) -> WorkflowResult<RoleSet> {
        self.run(move |tx| {
            let task = existing_task(tx, task_id)?;
            actor_roles(tx, &task, actor)
        })
        .await
    }

    /// Lists the statuses `actor` could move the task to next.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskNotFound`] when the task does not exist
    /// and [`WorkflowError::Rules`] when the rule table cannot be loaded.
    pub async fn allowed_transitions(
        &self,
        task_id: TaskId,
        actor: UserId,
    ) -> WorkflowResult<Vec<TaskStatus>> {
        let (task, roles) = self
            .run(move |tx| {
                let task = existing_task(tx, task_id)?;
                let roles = actor_roles(tx, &task, actor)?;
                Ok((task, roles))
            })
            .await?;
        Ok(self
            .validator
            .allowed_transitions(task.task_type(), task.status(), &roles)
            .await?)
    }

    /// Lists the task's participant rows.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskNotFound`] when the task does not exist.
    pub async fn participants(&self, task_id: TaskId) -> WorkflowResult<Vec<TaskParticipant>> {
        self.run(move |tx| {
            existing_task(tx, task_id)?;
            Ok(tx.participants(task_id)?)
        })
        .await
    }

    /// Lists every solution version of the task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskNotFound`] when the task does not exist.
    pub async fn solutions(&self, task_id: TaskId) -> WorkflowResult<Vec<Solution>> {
        self.run(move |tx| {
            existing_task(tx, task_id)?;
            Ok(tx.solutions(task_id)?)
        })
        .await
    }

    /// Lists every execution plan version of the task with its goals,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskNotFound`] when the task does not exist.
    pub async fn execution_plans(&self, task_id: TaskId) -> WorkflowResult<Vec<ExecutionPlan>> {
        self.run(move |tx| {
            existing_task(tx, task_id)?;
            Ok(tx.plans(task_id)?)
        })
        .await
    }

    /// Returns one review session.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::SessionNotFound`] when the session does not
    /// exist.
    pub async fn review_session(
        &self,
        session_id: ReviewSessionId,
    ) -> WorkflowResult<ReviewSession> {
        self.run(move |tx| existing_session(tx, session_id)).await
    }

    /// Lists the task's review sessions in the order they were opened.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskNotFound`] when the task does not exist.
    pub async fn review_sessions(&self, task_id: TaskId) -> WorkflowResult<Vec<ReviewSession>> {
        self.run(move |tx| {
            existing_task(tx, task_id)?;
            Ok(tx.sessions(task_id)?)
        })
        .await
    }

    /// Lists the records of a session, votes and the creator's decision
    /// alike.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::SessionNotFound`] when the session does not
    /// exist.
    pub async fn review_records(
        &self,
        session_id: ReviewSessionId,
    ) -> WorkflowResult<Vec<ReviewRecord>> {
        self.run(move |tx| {
            existing_session(tx, session_id)?;
            Ok(tx.review_records(session_id)?)
        })
        .await
    }

    /// Counts the votes cast in a session against its quorum.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::SessionNotFound`] when the session does not
    /// exist.
    pub async fn review_tally(&self, session_id: ReviewSessionId) -> WorkflowResult<ReviewTally> {
        self.run(move |tx| {
            let session = existing_session(tx, session_id)?;
            let records = tx.review_records(session_id)?;
            Ok(ReviewTally::of(&session, &records))
        })
        .await
    }

    /// Returns the task's audit trail, oldest entry first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::TaskNotFound`] when the task does not exist.
    pub async fn change_log(&self, task_id: TaskId) -> WorkflowResult<Vec<TaskChangeLog>> {
        self.run(move |tx| {
            existing_task(tx, task_id)?;
            Ok(tx.change_log(task_id)?)
        })
        .await
    }
}

fn existing_task(tx: &mut dyn WorkflowTransaction, task_id: TaskId) -> WorkflowResult<Task> {
    tx.find_task(task_id)?
        .ok_or(WorkflowError::TaskNotFound(task_id))
}

fn existing_session(
    tx: &mut dyn WorkflowTransaction,
    session_id: ReviewSessionId,
) -> WorkflowResult<ReviewSession> {
    tx.find_session(session_id)?
        .ok_or(WorkflowError::SessionNotFound(session_id))
}
