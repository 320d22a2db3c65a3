//! Unit-of-work port over every table the workflow writes.
//!
//! An orchestrator operation runs as one closure over a
//! [`WorkflowTransaction`]. The store commits the closure's writes when it
//! returns `Ok` and discards all of them when it returns `Err`.

use crate::artifact::domain::{
    ArtifactStatus, ArtifactVersion, ExecutionPlan, PlanId, Solution, SolutionId,
};
use crate::review::domain::{
    ReviewRecord, ReviewSession, ReviewSessionId, ReviewTarget, TargetKind,
};
use crate::task::domain::{ParticipantRole, Task, TaskChangeLog, TaskId, TaskParticipant, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Result type for workflow storage operations.
pub type WorkflowStoreResult<T> = Result<T, WorkflowStoreError>;

/// Transactional storage for the workflow engine.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Runs `operation` atomically.
    ///
    /// Writes made through the transaction become visible to later
    /// transactions only if `operation` returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns the operation's own error, or a [`WorkflowStoreError`]
    /// converted into `E` when the transaction cannot be opened or
    /// committed.
    async fn transaction<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn WorkflowTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<WorkflowStoreError> + Send + 'static;
}

/// Row-level reads and writes available inside one transaction.
///
/// Listing methods return rows in a stable order: artifacts by version,
/// sessions and change-log entries by creation time, records by vote time.
pub trait WorkflowTransaction {
    /// Inserts a new task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::DuplicateTask`] when the id is taken.
    fn insert_task(&mut self, task: &Task) -> WorkflowStoreResult<()>;

    /// Reads a task without locking it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn find_task(&mut self, id: TaskId) -> WorkflowStoreResult<Option<Task>>;

    /// Reads a task and holds its row lock until the transaction ends.
    ///
    /// Every write operation locks its task first, which serialises version
    /// allocation and roster changes per task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn lock_task(&mut self, id: TaskId) -> WorkflowStoreResult<Option<Task>>;

    /// Overwrites a stored task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::MissingRow`] when the task is absent.
    fn update_task(&mut self, task: &Task) -> WorkflowStoreResult<()>;

    /// Lists participant rows of a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn participants(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<TaskParticipant>>;

    /// Inserts a participant row.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::DuplicateParticipant`] when a row for
    /// the same `(task, user, role)` exists.
    fn insert_participant(&mut self, participant: &TaskParticipant) -> WorkflowStoreResult<()>;

    /// Overwrites a participant row identified by `(task, user, role)`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::MissingRow`] when the row is absent.
    fn update_participant(&mut self, participant: &TaskParticipant) -> WorkflowStoreResult<()>;

    /// Deletes a participant row, returning whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn delete_participant(
        &mut self,
        task_id: TaskId,
        user_id: UserId,
        role: ParticipantRole,
    ) -> WorkflowStoreResult<bool>;

    /// Returns the highest solution version of a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn latest_solution_version(
        &mut self,
        task_id: TaskId,
    ) -> WorkflowStoreResult<Option<ArtifactVersion>>;

    /// Inserts a solution version.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::DuplicateArtifactVersion`] when the
    /// version is already taken for the task.
    fn insert_solution(&mut self, solution: &Solution) -> WorkflowStoreResult<()>;

    /// Reads a solution version.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn find_solution(&mut self, id: SolutionId) -> WorkflowStoreResult<Option<Solution>>;

    /// Records the review outcome of a solution version.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::MissingRow`] when the solution is absent.
    fn update_solution_status(
        &mut self,
        id: SolutionId,
        status: ArtifactStatus,
    ) -> WorkflowStoreResult<()>;

    /// Lists every solution version of a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn solutions(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<Solution>>;

    /// Returns the highest execution plan version of a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn latest_plan_version(&mut self, task_id: TaskId)
    -> WorkflowStoreResult<Option<ArtifactVersion>>;

    /// Inserts an execution plan version with its goals.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::DuplicateArtifactVersion`] when the
    /// version is already taken for the task.
    fn insert_plan(&mut self, plan: &ExecutionPlan) -> WorkflowStoreResult<()>;

    /// Reads an execution plan version with its goals.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn find_plan(&mut self, id: PlanId) -> WorkflowStoreResult<Option<ExecutionPlan>>;

    /// Records the review outcome of an execution plan version.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::MissingRow`] when the plan is absent.
    fn update_plan_status(&mut self, id: PlanId, status: ArtifactStatus)
    -> WorkflowStoreResult<()>;

    /// Lists every execution plan version of a task with goals.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn plans(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<ExecutionPlan>>;

    /// Inserts a review session.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::DuplicateOpenSession`] when another
    /// session is already in review for the same target, and
    /// [`WorkflowStoreError::Persistence`] on storage failure.
    fn insert_session(&mut self, session: &ReviewSession) -> WorkflowStoreResult<()>;

    /// Reads a review session.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn find_session(&mut self, id: ReviewSessionId) -> WorkflowStoreResult<Option<ReviewSession>>;

    /// Overwrites a review session.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::MissingRow`] when the session is absent.
    fn update_session(&mut self, session: &ReviewSession) -> WorkflowStoreResult<()>;

    /// Lists every review session of a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn sessions(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<ReviewSession>>;

    /// Returns the session still in review for `target`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn open_session_for_target(
        &mut self,
        task_id: TaskId,
        target: ReviewTarget,
    ) -> WorkflowStoreResult<Option<ReviewSession>>;

    /// Inserts a vote.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::DuplicateReviewRecord`] when the
    /// reviewer already voted in the session.
    fn insert_review_record(&mut self, record: &ReviewRecord) -> WorkflowStoreResult<()>;

    /// Lists the votes of a session.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn review_records(
        &mut self,
        session_id: ReviewSessionId,
    ) -> WorkflowStoreResult<Vec<ReviewRecord>>;

    /// Deletes a reviewer's votes in a session, returning how many went.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn delete_review_records(
        &mut self,
        session_id: ReviewSessionId,
        reviewer_id: UserId,
    ) -> WorkflowStoreResult<usize>;

    /// Appends an audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn append_change_log(&mut self, entry: &TaskChangeLog) -> WorkflowStoreResult<()>;

    /// Lists the audit entries of a task.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] on storage failure.
    fn change_log(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<TaskChangeLog>>;
}

/// Errors returned by workflow store implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A participant row for `(task, user, role)` already exists.
    #[error("user {user_id} is already a {role} participant of task {task_id}")]
    DuplicateParticipant {
        /// Owning task.
        task_id: TaskId,
        /// Participating user.
        user_id: UserId,
        /// Participation role.
        role: ParticipantRole,
    },

    /// The artifact version is already taken for the task.
    #[error("{kind} version {version} already exists for task {task_id}")]
    DuplicateArtifactVersion {
        /// Owning task.
        task_id: TaskId,
        /// Artifact kind.
        kind: TargetKind,
        /// Contested version.
        version: ArtifactVersion,
    },

    /// The reviewer already voted in the session.
    #[error("reviewer {reviewer_id} already voted in session {session_id}")]
    DuplicateReviewRecord {
        /// Session voted in.
        session_id: ReviewSessionId,
        /// Voting user.
        reviewer_id: UserId,
    },

    /// A session is already in review for the same target.
    #[error("a session of task {task_id} is already reviewing {target}")]
    DuplicateOpenSession {
        /// Owning task.
        task_id: TaskId,
        /// Contested target.
        target: ReviewTarget,
    },

    /// A row addressed by an update does not exist.
    #[error("{table} row {id} not found")]
    MissingRow {
        /// Table name.
        table: &'static str,
        /// Row key.
        id: Uuid,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Reports a missing row.
    #[must_use]
    pub const fn missing_row(table: &'static str, id: Uuid) -> Self {
        Self::MissingRow { table, id }
    }
}
