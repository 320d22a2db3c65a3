//! Task aggregate root.

use super::{Priority, TaskDomainError, TaskId, TaskStatus, TaskType, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Fields supplied when registering a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Kind of task, selecting status set and rules.
    pub task_type: TaskType,
    /// Short human-readable title.
    pub title: String,
    /// User who owns and reviews the task.
    pub creator_id: UserId,
    /// User expected to do the work, if already known.
    pub executor_id: Option<UserId>,
    /// Direct parent in the task hierarchy.
    pub parent_id: Option<TaskId>,
    /// Root of the task hierarchy.
    pub root_id: Option<TaskId>,
    /// Relative urgency.
    pub priority: Priority,
    /// Advisory number of days allowed for the solution.
    pub solution_deadline_days: Option<u32>,
}

/// Task aggregate root.
///
/// The status is only ever changed through [`Task::move_to`], which keeps
/// it inside the status set of the task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    task_type: TaskType,
    status: TaskStatus,
    title: String,
    creator_id: UserId,
    executor_id: Option<UserId>,
    parent_id: Option<TaskId>,
    root_id: Option<TaskId>,
    priority: Priority,
    solution_deadline_days: Option<u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task type.
    pub task_type: TaskType,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted title.
    pub title: String,
    /// Persisted creator.
    pub creator_id: UserId,
    /// Persisted executor, if any.
    pub executor_id: Option<UserId>,
    /// Persisted parent task, if any.
    pub parent_id: Option<TaskId>,
    /// Persisted root task, if any.
    pub root_id: Option<TaskId>,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted advisory solution deadline in days.
    pub solution_deadline_days: Option<u32>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task from a draft.
    ///
    /// The task starts in [`TaskStatus::PendingAccept`] when an executor is
    /// named and in [`TaskStatus::Unassigned`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] for a blank title and
    /// [`TaskDomainError::CreatorAsExecutor`] when the creator names
    /// themselves as executor.
    pub fn new(draft: TaskDraft, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }

        let id = TaskId::new();
        if draft.executor_id == Some(draft.creator_id) {
            return Err(TaskDomainError::CreatorAsExecutor(id));
        }

        let status = if draft.executor_id.is_some() {
            TaskStatus::PendingAccept
        } else {
            TaskStatus::Unassigned
        };
        let timestamp = clock.utc();

        Ok(Self {
            id,
            task_type: draft.task_type,
            status,
            title: title.to_owned(),
            creator_id: draft.creator_id,
            executor_id: draft.executor_id,
            parent_id: draft.parent_id,
            root_id: draft.root_id,
            priority: draft.priority,
            solution_deadline_days: draft.solution_deadline_days,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::StatusNotInType`] when the stored status
    /// does not belong to the stored task type.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        ensure_status_in_type(data.task_type, data.status)?;
        Ok(Self {
            id: data.id,
            task_type: data.task_type,
            status: data.status,
            title: data.title,
            creator_id: data.creator_id,
            executor_id: data.executor_id,
            parent_id: data.parent_id,
            root_id: data.root_id,
            priority: data.priority,
            solution_deadline_days: data.solution_deadline_days,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the creator.
    #[must_use]
    pub const fn creator_id(&self) -> UserId {
        self.creator_id
    }

    /// Returns the assigned executor, if any.
    #[must_use]
    pub const fn executor_id(&self) -> Option<UserId> {
        self.executor_id
    }

    /// Returns the parent task, if any.
    #[must_use]
    pub const fn parent_id(&self) -> Option<TaskId> {
        self.parent_id
    }

    /// Returns the root task, if any.
    #[must_use]
    pub const fn root_id(&self) -> Option<TaskId> {
        self.root_id
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the advisory solution deadline in days.
    ///
    /// Stored for display only; nothing enforces it.
    #[must_use]
    pub const fn solution_deadline_days(&self) -> Option<u32> {
        self.solution_deadline_days
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when `user` created this task.
    #[must_use]
    pub fn is_creator(&self, user: UserId) -> bool {
        self.creator_id == user
    }

    /// Returns `true` when `user` is the assigned executor.
    #[must_use]
    pub fn is_executor(&self, user: UserId) -> bool {
        self.executor_id == Some(user)
    }

    /// Moves the task to `status`.
    ///
    /// Edge legality is decided by the transition table before this is
    /// called; the aggregate only guards status set membership.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::StatusNotInType`] when `status` is not
    /// defined for the task type. The task is left unchanged.
    pub fn move_to(&mut self, status: TaskStatus, clock: &impl Clock) -> Result<(), TaskDomainError> {
        ensure_status_in_type(self.task_type, status)?;
        self.status = status;
        self.touch(clock);
        Ok(())
    }

    /// Assigns `executor` to the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::CreatorAsExecutor`] when `executor` is the
    /// creator.
    pub fn assign_executor(
        &mut self,
        executor: UserId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if executor == self.creator_id {
            return Err(TaskDomainError::CreatorAsExecutor(self.id));
        }
        self.executor_id = Some(executor);
        self.touch(clock);
        Ok(())
    }

    /// Removes the executor assignment.
    pub fn clear_executor(&mut self, clock: &impl Clock) {
        self.executor_id = None;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

fn ensure_status_in_type(task_type: TaskType, status: TaskStatus) -> Result<(), TaskDomainError> {
    if task_type.defines(status) {
        Ok(())
    } else {
        Err(TaskDomainError::StatusNotInType { task_type, status })
    }
}
