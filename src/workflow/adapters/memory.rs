//! In-memory workflow store for tests and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::artifact::domain::{
    ArtifactStatus, ArtifactVersion, ExecutionPlan, PlanId, Solution, SolutionId,
};
use crate::review::domain::{
    ReviewRecord, ReviewSession, ReviewSessionId, ReviewTarget, TargetKind,
};
use crate::task::domain::{ParticipantRole, Task, TaskChangeLog, TaskId, TaskParticipant, UserId};
use crate::workflow::ports::{
    WorkflowStore, WorkflowStoreError, WorkflowStoreResult, WorkflowTransaction,
};

/// Thread-safe in-memory workflow store.
///
/// Transactions are serialised behind one mutex. Each runs against a copy of
/// the tables that replaces the shared state only when the operation
/// succeeds, so a failed operation leaves no trace.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowStore {
    state: Arc<Mutex<WorkflowTables>>,
}

#[derive(Debug, Clone, Default)]
struct WorkflowTables {
    tasks: HashMap<TaskId, Task>,
    participants: Vec<TaskParticipant>,
    solutions: Vec<Solution>,
    plans: Vec<ExecutionPlan>,
    sessions: Vec<ReviewSession>,
    records: Vec<ReviewRecord>,
    change_log: Vec<TaskChangeLog>,
    fail_change_log: bool,
}

impl InMemoryWorkflowStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later change-log append fail with a persistence error.
    ///
    /// Used to prove that an operation failing on its last write rolls back
    /// everything it wrote before.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowStoreError::Persistence`] when the state lock is
    /// poisoned.
    pub fn inject_change_log_failure(&self, enabled: bool) -> WorkflowStoreResult<()> {
        self.lock()?.fail_change_log = enabled;
        Ok(())
    }

    fn lock(&self) -> WorkflowStoreResult<MutexGuard<'_, WorkflowTables>> {
        self.state.lock().map_err(|err| {
            WorkflowStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn transaction<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn WorkflowTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<WorkflowStoreError> + Send + 'static,
    {
        let mut state = self.lock()?;
        let mut working = state.clone();
        let value = operation(&mut working)?;
        *state = working;
        Ok(value)
    }
}

impl WorkflowTransaction for WorkflowTables {
    fn insert_task(&mut self, task: &Task) -> WorkflowStoreResult<()> {
        if self.tasks.contains_key(&task.id()) {
            return Err(WorkflowStoreError::DuplicateTask(task.id()));
        }
        self.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn find_task(&mut self, id: TaskId) -> WorkflowStoreResult<Option<Task>> {
        Ok(self.tasks.get(&id).cloned())
    }

    fn lock_task(&mut self, id: TaskId) -> WorkflowStoreResult<Option<Task>> {
        // The store mutex already serialises whole transactions.
        self.find_task(id)
    }

    fn update_task(&mut self, task: &Task) -> WorkflowStoreResult<()> {
        let slot = self
            .tasks
            .get_mut(&task.id())
            .ok_or_else(|| WorkflowStoreError::missing_row("tasks", task.id().into_inner()))?;
        *slot = task.clone();
        Ok(())
    }

    fn participants(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<TaskParticipant>> {
        Ok(self
            .participants
            .iter()
            .filter(|row| row.task_id() == task_id)
            .cloned()
            .collect())
    }

    fn insert_participant(&mut self, participant: &TaskParticipant) -> WorkflowStoreResult<()> {
        if self.participant_index(participant).is_some() {
            return Err(WorkflowStoreError::DuplicateParticipant {
                task_id: participant.task_id(),
                user_id: participant.user_id(),
                role: participant.role(),
            });
        }
        self.participants.push(participant.clone());
        Ok(())
    }

    fn update_participant(&mut self, participant: &TaskParticipant) -> WorkflowStoreResult<()> {
        let index = self.participant_index(participant).ok_or_else(|| {
            WorkflowStoreError::missing_row(
                "task_participants",
                participant.user_id().into_inner(),
            )
        })?;
        if let Some(slot) = self.participants.get_mut(index) {
            *slot = participant.clone();
        }
        Ok(())
    }

    fn delete_participant(
        &mut self,
        task_id: TaskId,
        user_id: UserId,
        role: ParticipantRole,
    ) -> WorkflowStoreResult<bool> {
        let before = self.participants.len();
        self.participants.retain(|row| {
            !(row.task_id() == task_id && row.user_id() == user_id && row.role() == role)
        });
        Ok(self.participants.len() != before)
    }

    fn latest_solution_version(
        &mut self,
        task_id: TaskId,
    ) -> WorkflowStoreResult<Option<ArtifactVersion>> {
        Ok(self
            .solutions
            .iter()
            .filter(|solution| solution.task_id() == task_id)
            .map(Solution::version)
            .max())
    }

    fn insert_solution(&mut self, solution: &Solution) -> WorkflowStoreResult<()> {
        let taken = self.solutions.iter().any(|existing| {
            existing.task_id() == solution.task_id() && existing.version() == solution.version()
        });
        if taken {
            return Err(WorkflowStoreError::DuplicateArtifactVersion {
                task_id: solution.task_id(),
                kind: TargetKind::Solution,
                version: solution.version(),
            });
        }
        self.solutions.push(solution.clone());
        Ok(())
    }

    fn find_solution(&mut self, id: SolutionId) -> WorkflowStoreResult<Option<Solution>> {
        Ok(self
            .solutions
            .iter()
            .find(|solution| solution.id() == id)
            .cloned())
    }

    fn update_solution_status(
        &mut self,
        id: SolutionId,
        status: ArtifactStatus,
    ) -> WorkflowStoreResult<()> {
        let solution = self
            .solutions
            .iter_mut()
            .find(|solution| solution.id() == id)
            .ok_or_else(|| WorkflowStoreError::missing_row("solutions", id.into_inner()))?;
        solution.settle(status);
        Ok(())
    }

    fn solutions(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<Solution>> {
        let mut rows: Vec<Solution> = self
            .solutions
            .iter()
            .filter(|solution| solution.task_id() == task_id)
            .cloned()
            .collect();
        rows.sort_by_key(Solution::version);
        Ok(rows)
    }

    fn latest_plan_version(
        &mut self,
        task_id: TaskId,
    ) -> WorkflowStoreResult<Option<ArtifactVersion>> {
        Ok(self
            .plans
            .iter()
            .filter(|plan| plan.task_id() == task_id)
            .map(ExecutionPlan::version)
            .max())
    }

    fn insert_plan(&mut self, plan: &ExecutionPlan) -> WorkflowStoreResult<()> {
        let taken = self.plans.iter().any(|existing| {
            existing.task_id() == plan.task_id() && existing.version() == plan.version()
        });
        if taken {
            return Err(WorkflowStoreError::DuplicateArtifactVersion {
                task_id: plan.task_id(),
                kind: TargetKind::ExecutionPlan,
                version: plan.version(),
            });
        }
        self.plans.push(plan.clone());
        Ok(())
    }

    fn find_plan(&mut self, id: PlanId) -> WorkflowStoreResult<Option<ExecutionPlan>> {
        Ok(self.plans.iter().find(|plan| plan.id() == id).cloned())
    }

    fn update_plan_status(
        &mut self,
        id: PlanId,
        status: ArtifactStatus,
    ) -> WorkflowStoreResult<()> {
        let plan = self
            .plans
            .iter_mut()
            .find(|plan| plan.id() == id)
            .ok_or_else(|| WorkflowStoreError::missing_row("execution_plans", id.into_inner()))?;
        plan.settle(status);
        Ok(())
    }

    fn plans(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<ExecutionPlan>> {
        let mut rows: Vec<ExecutionPlan> = self
            .plans
            .iter()
            .filter(|plan| plan.task_id() == task_id)
            .cloned()
            .collect();
        rows.sort_by_key(ExecutionPlan::version);
        Ok(rows)
    }

    fn insert_session(&mut self, session: &ReviewSession) -> WorkflowStoreResult<()> {
        if session.is_open()
            && self
                .sessions
                .iter()
                .any(|existing| existing.is_open() && existing.target() == session.target())
        {
            return Err(WorkflowStoreError::DuplicateOpenSession {
                task_id: session.task_id(),
                target: session.target(),
            });
        }
        self.sessions.push(session.clone());
        Ok(())
    }

    fn find_session(&mut self, id: ReviewSessionId) -> WorkflowStoreResult<Option<ReviewSession>> {
        Ok(self
            .sessions
            .iter()
            .find(|session| session.id() == id)
            .cloned())
    }

    fn update_session(&mut self, session: &ReviewSession) -> WorkflowStoreResult<()> {
        let slot = self
            .sessions
            .iter_mut()
            .find(|existing| existing.id() == session.id())
            .ok_or_else(|| {
                WorkflowStoreError::missing_row("review_sessions", session.id().into_inner())
            })?;
        *slot = session.clone();
        Ok(())
    }

    fn sessions(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<ReviewSession>> {
        Ok(self
            .sessions
            .iter()
            .filter(|session| session.task_id() == task_id)
            .cloned()
            .collect())
    }

    fn open_session_for_target(
        &mut self,
        task_id: TaskId,
        target: ReviewTarget,
    ) -> WorkflowStoreResult<Option<ReviewSession>> {
        Ok(self
            .sessions
            .iter()
            .find(|session| {
                session.task_id() == task_id && session.target() == target && session.is_open()
            })
            .cloned())
    }

    fn insert_review_record(&mut self, record: &ReviewRecord) -> WorkflowStoreResult<()> {
        let voted = self.records.iter().any(|existing| {
            existing.session_id() == record.session_id()
                && existing.reviewer_id() == record.reviewer_id()
        });
        if voted {
            return Err(WorkflowStoreError::DuplicateReviewRecord {
                session_id: record.session_id(),
                reviewer_id: record.reviewer_id(),
            });
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn review_records(
        &mut self,
        session_id: ReviewSessionId,
    ) -> WorkflowStoreResult<Vec<ReviewRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| record.session_id() == session_id)
            .cloned()
            .collect())
    }

    fn delete_review_records(
        &mut self,
        session_id: ReviewSessionId,
        reviewer_id: UserId,
    ) -> WorkflowStoreResult<usize> {
        let before = self.records.len();
        self.records.retain(|record| {
            !(record.session_id() == session_id && record.reviewer_id() == reviewer_id)
        });
        Ok(before.saturating_sub(self.records.len()))
    }

    fn append_change_log(&mut self, entry: &TaskChangeLog) -> WorkflowStoreResult<()> {
        if self.fail_change_log {
            return Err(WorkflowStoreError::persistence(std::io::Error::other(
                "change log unavailable",
            )));
        }
        self.change_log.push(entry.clone());
        Ok(())
    }

    fn change_log(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<TaskChangeLog>> {
        Ok(self
            .change_log
            .iter()
            .filter(|entry| entry.task_id() == task_id)
            .cloned()
            .collect())
    }
}

impl WorkflowTables {
    fn participant_index(&self, participant: &TaskParticipant) -> Option<usize> {
        self.participants.iter().position(|row| {
            row.task_id() == participant.task_id()
                && row.user_id() == participant.user_id()
                && row.role() == participant.role()
        })
    }
}
