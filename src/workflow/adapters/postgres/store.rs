//! `PostgreSQL` workflow store: one Diesel transaction per operation.

use super::{
    conversion::{
        change_log_to_row, participant_to_row, plan_to_rows, record_to_row, row_to_change_log,
        row_to_participant, row_to_record, row_to_session, row_to_solution, row_to_task,
        rows_to_plan, session_to_row, solution_to_row, task_to_row,
    },
    models::{
        ChangeLogRow, GoalRow, ParticipantRow, PlanRow, RecordRow, SessionRow, SolutionRow,
        TaskRow,
    },
    schema::{
        execution_plans, goals, review_records, review_sessions, solutions, task_change_logs,
        task_participants, tasks,
    },
};
use crate::artifact::domain::{
    ArtifactStatus, ArtifactVersion, ExecutionPlan, PlanId, Solution, SolutionId,
};
use crate::review::domain::{
    ReviewRecord, ReviewSession, ReviewSessionId, ReviewTarget, SessionStatus, TargetKind,
};
use crate::task::domain::{ParticipantRole, Task, TaskChangeLog, TaskId, TaskParticipant, UserId};
use crate::workflow::ports::{
    WorkflowStore, WorkflowStoreError, WorkflowStoreResult, WorkflowTransaction,
};
use async_trait::async_trait;
use diesel::dsl::max;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by the workflow store.
pub type WorkflowPgPool = Pool<ConnectionManager<PgConnection>>;

const SOLUTION_VERSION_KEY: &str = "solutions_task_version_key";
const PLAN_VERSION_KEY: &str = "execution_plans_task_version_key";
const REVIEW_RECORD_KEY: &str = "review_records_session_reviewer_key";
const OPEN_SESSION_KEY: &str = "review_sessions_open_target_idx";

/// `PostgreSQL`-backed workflow store.
///
/// Every operation runs inside a single database transaction. Task rows are
/// locked with `SELECT ... FOR UPDATE`, which serialises concurrent
/// operations on the same task.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowStore {
    pool: WorkflowPgPool,
}

impl PostgresWorkflowStore {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WorkflowPgPool) -> Self {
        Self { pool }
    }
}

/// Either the operation's own error or a failure to begin or commit.
enum TransactionFailure<E> {
    Operation(E),
    Database(DieselError),
}

impl<E> From<DieselError> for TransactionFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

impl<E: From<WorkflowStoreError>> TransactionFailure<E> {
    fn into_error(self) -> E {
        match self {
            Self::Operation(err) => err,
            Self::Database(err) => E::from(WorkflowStoreError::persistence(err)),
        }
    }
}

#[async_trait]
impl WorkflowStore for PostgresWorkflowStore {
    async fn transaction<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn WorkflowTransaction) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<WorkflowStoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool
                .get()
                .map_err(|err| E::from(WorkflowStoreError::persistence(err)))?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .transaction::<T, TransactionFailure<E>, _>(|conn| {
                    let mut tx = PgWorkflowTransaction { conn };
                    operation(&mut tx).map_err(TransactionFailure::Operation)
                })
                .map_err(TransactionFailure::into_error)
        })
        .await
        .map_err(|err| E::from(WorkflowStoreError::persistence(err)))?
    }
}

/// Row access bound to one open Diesel transaction.
struct PgWorkflowTransaction<'conn> {
    conn: &'conn mut PgConnection,
}

fn violates(err: &DieselError, constraint: &str) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

/// Maps a failed session insert, reporting the open-target index as a
/// conflict.
pub(super) fn session_insert_error(err: DieselError, session: &ReviewSession) -> WorkflowStoreError {
    if violates(&err, OPEN_SESSION_KEY) {
        WorkflowStoreError::DuplicateOpenSession {
            task_id: session.task_id(),
            target: session.target(),
        }
    } else {
        WorkflowStoreError::persistence(err)
    }
}

const fn is_unique_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

const fn affected(count: usize, table: &'static str, id: Uuid) -> WorkflowStoreResult<()> {
    if count == 0 {
        Err(WorkflowStoreError::missing_row(table, id))
    } else {
        Ok(())
    }
}

impl PgWorkflowTransaction<'_> {
    fn load_goals(&mut self, plan_ids: &[Uuid]) -> WorkflowStoreResult<HashMap<Uuid, Vec<GoalRow>>> {
        let rows = goals::table
            .filter(goals::plan_id.eq_any(plan_ids))
            .order((goals::plan_id.asc(), goals::goal_no.asc()))
            .select(GoalRow::as_select())
            .load::<GoalRow>(self.conn)
            .map_err(WorkflowStoreError::persistence)?;
        let mut grouped: HashMap<Uuid, Vec<GoalRow>> = HashMap::new();
        for row in rows {
            grouped.entry(row.plan_id).or_default().push(row);
        }
        Ok(grouped)
    }

    fn assemble_plans(&mut self, rows: Vec<PlanRow>) -> WorkflowStoreResult<Vec<ExecutionPlan>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut grouped = self.load_goals(&ids)?;
        rows.into_iter()
            .map(|row| {
                let goal_rows = grouped.remove(&row.id).unwrap_or_default();
                rows_to_plan(row, goal_rows)
            })
            .collect()
    }
}

impl WorkflowTransaction for PgWorkflowTransaction<'_> {
    fn insert_task(&mut self, task: &Task) -> WorkflowStoreResult<()> {
        let row = task_to_row(task)?;
        diesel::insert_into(tasks::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| {
                if is_unique_violation(&err) {
                    WorkflowStoreError::DuplicateTask(task.id())
                } else {
                    WorkflowStoreError::persistence(err)
                }
            })?;
        Ok(())
    }

    fn find_task(&mut self, id: TaskId) -> WorkflowStoreResult<Option<Task>> {
        tasks::table
            .find(id.into_inner())
            .select(TaskRow::as_select())
            .first::<TaskRow>(self.conn)
            .optional()
            .map_err(WorkflowStoreError::persistence)?
            .map(row_to_task)
            .transpose()
    }

    fn lock_task(&mut self, id: TaskId) -> WorkflowStoreResult<Option<Task>> {
        tasks::table
            .find(id.into_inner())
            .for_update()
            .select(TaskRow::as_select())
            .first::<TaskRow>(self.conn)
            .optional()
            .map_err(WorkflowStoreError::persistence)?
            .map(row_to_task)
            .transpose()
    }

    fn update_task(&mut self, task: &Task) -> WorkflowStoreResult<()> {
        let row = task_to_row(task)?;
        let count = diesel::update(tasks::table.find(row.id))
            .set((
                tasks::status.eq(&row.status),
                tasks::title.eq(&row.title),
                tasks::executor_id.eq(row.executor_id),
                tasks::priority.eq(&row.priority),
                tasks::solution_deadline_days.eq(row.solution_deadline_days),
                tasks::updated_at.eq(row.updated_at),
            ))
            .execute(self.conn)
            .map_err(WorkflowStoreError::persistence)?;
        affected(count, "tasks", row.id)
    }

    fn participants(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<TaskParticipant>> {
        task_participants::table
            .filter(task_participants::task_id.eq(task_id.into_inner()))
            .order((
                task_participants::invited_at.asc(),
                task_participants::user_id.asc(),
            ))
            .select(ParticipantRow::as_select())
            .load::<ParticipantRow>(self.conn)
            .map_err(WorkflowStoreError::persistence)?
            .into_iter()
            .map(row_to_participant)
            .collect()
    }

    fn insert_participant(&mut self, participant: &TaskParticipant) -> WorkflowStoreResult<()> {
        diesel::insert_into(task_participants::table)
            .values(&participant_to_row(participant))
            .execute(self.conn)
            .map_err(|err| {
                if is_unique_violation(&err) {
                    WorkflowStoreError::DuplicateParticipant {
                        task_id: participant.task_id(),
                        user_id: participant.user_id(),
                        role: participant.role(),
                    }
                } else {
                    WorkflowStoreError::persistence(err)
                }
            })?;
        Ok(())
    }

    fn update_participant(&mut self, participant: &TaskParticipant) -> WorkflowStoreResult<()> {
        let row = participant_to_row(participant);
        let count = diesel::update(
            task_participants::table
                .filter(task_participants::task_id.eq(row.task_id))
                .filter(task_participants::user_id.eq(row.user_id))
                .filter(task_participants::role.eq(&row.role)),
        )
        .set((
            task_participants::status.eq(&row.status),
            task_participants::invited_by.eq(row.invited_by),
            task_participants::invited_at.eq(row.invited_at),
        ))
        .execute(self.conn)
        .map_err(WorkflowStoreError::persistence)?;
        affected(count, "task_participants", row.user_id)
    }

    fn delete_participant(
        &mut self,
        task_id: TaskId,
        user_id: UserId,
        role: ParticipantRole,
    ) -> WorkflowStoreResult<bool> {
        let count = diesel::delete(
            task_participants::table
                .filter(task_participants::task_id.eq(task_id.into_inner()))
                .filter(task_participants::user_id.eq(user_id.into_inner()))
                .filter(task_participants::role.eq(role.as_str())),
        )
        .execute(self.conn)
        .map_err(WorkflowStoreError::persistence)?;
        Ok(count > 0)
    }

    fn latest_solution_version(
        &mut self,
        task_id: TaskId,
    ) -> WorkflowStoreResult<Option<ArtifactVersion>> {
        solutions::table
            .filter(solutions::task_id.eq(task_id.into_inner()))
            .select(max(solutions::version))
            .first::<Option<i32>>(self.conn)
            .map_err(WorkflowStoreError::persistence)?
            .map(|value| {
                ArtifactVersion::from_stored(value).map_err(WorkflowStoreError::persistence)
            })
            .transpose()
    }

    fn insert_solution(&mut self, solution: &Solution) -> WorkflowStoreResult<()> {
        diesel::insert_into(solutions::table)
            .values(&solution_to_row(solution)?)
            .execute(self.conn)
            .map_err(|err| {
                if violates(&err, SOLUTION_VERSION_KEY) {
                    WorkflowStoreError::DuplicateArtifactVersion {
                        task_id: solution.task_id(),
                        kind: TargetKind::Solution,
                        version: solution.version(),
                    }
                } else {
                    WorkflowStoreError::persistence(err)
                }
            })?;
        Ok(())
    }

    fn find_solution(&mut self, id: SolutionId) -> WorkflowStoreResult<Option<Solution>> {
        solutions::table
            .find(id.into_inner())
            .select(SolutionRow::as_select())
            .first::<SolutionRow>(self.conn)
            .optional()
            .map_err(WorkflowStoreError::persistence)?
            .map(row_to_solution)
            .transpose()
    }

    fn update_solution_status(
        &mut self,
        id: SolutionId,
        status: ArtifactStatus,
    ) -> WorkflowStoreResult<()> {
        let count = diesel::update(solutions::table.find(id.into_inner()))
            .set(solutions::status.eq(status.as_str()))
            .execute(self.conn)
            .map_err(WorkflowStoreError::persistence)?;
        affected(count, "solutions", id.into_inner())
    }

    fn solutions(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<Solution>> {
        solutions::table
            .filter(solutions::task_id.eq(task_id.into_inner()))
            .order(solutions::version.asc())
            .select(SolutionRow::as_select())
            .load::<SolutionRow>(self.conn)
            .map_err(WorkflowStoreError::persistence)?
            .into_iter()
            .map(row_to_solution)
            .collect()
    }

    fn latest_plan_version(
        &mut self,
        task_id: TaskId,
    ) -> WorkflowStoreResult<Option<ArtifactVersion>> {
        execution_plans::table
            .filter(execution_plans::task_id.eq(task_id.into_inner()))
            .select(max(execution_plans::version))
            .first::<Option<i32>>(self.conn)
            .map_err(WorkflowStoreError::persistence)?
            .map(|value| {
                ArtifactVersion::from_stored(value).map_err(WorkflowStoreError::persistence)
            })
            .transpose()
    }

    fn insert_plan(&mut self, plan: &ExecutionPlan) -> WorkflowStoreResult<()> {
        let (row, goal_rows) = plan_to_rows(plan)?;
        diesel::insert_into(execution_plans::table)
            .values(&row)
            .execute(self.conn)
            .map_err(|err| {
                if violates(&err, PLAN_VERSION_KEY) {
                    WorkflowStoreError::DuplicateArtifactVersion {
                        task_id: plan.task_id(),
                        kind: TargetKind::ExecutionPlan,
                        version: plan.version(),
                    }
                } else {
                    WorkflowStoreError::persistence(err)
                }
            })?;
        diesel::insert_into(goals::table)
            .values(&goal_rows)
            .execute(self.conn)
            .map_err(WorkflowStoreError::persistence)?;
        Ok(())
    }

    fn find_plan(&mut self, id: PlanId) -> WorkflowStoreResult<Option<ExecutionPlan>> {
        let row = execution_plans::table
            .find(id.into_inner())
            .select(PlanRow::as_select())
            .first::<PlanRow>(self.conn)
            .optional()
            .map_err(WorkflowStoreError::persistence)?;
        match row {
            Some(found) => Ok(self.assemble_plans(vec![found])?.pop()),
            None => Ok(None),
        }
    }

    fn update_plan_status(
        &mut self,
        id: PlanId,
        status: ArtifactStatus,
    ) -> WorkflowStoreResult<()> {
        let count = diesel::update(execution_plans::table.find(id.into_inner()))
            .set(execution_plans::status.eq(status.as_str()))
            .execute(self.conn)
            .map_err(WorkflowStoreError::persistence)?;
        affected(count, "execution_plans", id.into_inner())
    }

    fn plans(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<ExecutionPlan>> {
        let rows = execution_plans::table
            .filter(execution_plans::task_id.eq(task_id.into_inner()))
            .order(execution_plans::version.asc())
            .select(PlanRow::as_select())
            .load::<PlanRow>(self.conn)
            .map_err(WorkflowStoreError::persistence)?;
        self.assemble_plans(rows)
    }

    fn insert_session(&mut self, session: &ReviewSession) -> WorkflowStoreResult<()> {
        diesel::insert_into(review_sessions::table)
            .values(&session_to_row(session)?)
            .execute(self.conn)
            .map_err(|err| session_insert_error(err, session))?;
        Ok(())
    }

    fn find_session(&mut self, id: ReviewSessionId) -> WorkflowStoreResult<Option<ReviewSession>> {
        review_sessions::table
            .find(id.into_inner())
            .select(SessionRow::as_select())
            .first::<SessionRow>(self.conn)
            .optional()
            .map_err(WorkflowStoreError::persistence)?
            .map(row_to_session)
            .transpose()
    }

    fn update_session(&mut self, session: &ReviewSession) -> WorkflowStoreResult<()> {
        let row = session_to_row(session)?;
        let count = diesel::update(review_sessions::table.find(row.id))
            .set((
                review_sessions::review_mode.eq(&row.review_mode),
                review_sessions::required_approvals.eq(row.required_approvals),
                review_sessions::status.eq(&row.status),
                review_sessions::final_decision.eq(&row.final_decision),
                review_sessions::decided_by.eq(row.decided_by),
                review_sessions::decided_at.eq(row.decided_at),
                review_sessions::decision_comment.eq(&row.decision_comment),
                review_sessions::completed_at.eq(row.completed_at),
            ))
            .execute(self.conn)
            .map_err(WorkflowStoreError::persistence)?;
        affected(count, "review_sessions", row.id)
    }

    fn sessions(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<ReviewSession>> {
        review_sessions::table
            .filter(review_sessions::task_id.eq(task_id.into_inner()))
            .order((
                review_sessions::initiated_at.asc(),
                review_sessions::id.asc(),
            ))
            .select(SessionRow::as_select())
            .load::<SessionRow>(self.conn)
            .map_err(WorkflowStoreError::persistence)?
            .into_iter()
            .map(row_to_session)
            .collect()
    }

    fn open_session_for_target(
        &mut self,
        task_id: TaskId,
        target: ReviewTarget,
    ) -> WorkflowStoreResult<Option<ReviewSession>> {
        review_sessions::table
            .filter(review_sessions::task_id.eq(task_id.into_inner()))
            .filter(review_sessions::target_type.eq(target.kind().as_str()))
            .filter(review_sessions::target_id.eq(target.id()))
            .filter(review_sessions::status.eq(SessionStatus::InReview.as_str()))
            .select(SessionRow::as_select())
            .first::<SessionRow>(self.conn)
            .optional()
            .map_err(WorkflowStoreError::persistence)?
            .map(row_to_session)
            .transpose()
    }

    fn insert_review_record(&mut self, record: &ReviewRecord) -> WorkflowStoreResult<()> {
        diesel::insert_into(review_records::table)
            .values(&record_to_row(record))
            .execute(self.conn)
            .map_err(|err| {
                if violates(&err, REVIEW_RECORD_KEY) {
                    WorkflowStoreError::DuplicateReviewRecord {
                        session_id: record.session_id(),
                        reviewer_id: record.reviewer_id(),
                    }
                } else {
                    WorkflowStoreError::persistence(err)
                }
            })?;
        Ok(())
    }

    fn review_records(
        &mut self,
        session_id: ReviewSessionId,
    ) -> WorkflowStoreResult<Vec<ReviewRecord>> {
        review_records::table
            .filter(review_records::session_id.eq(session_id.into_inner()))
            .order((review_records::created_at.asc(), review_records::id.asc()))
            .select(RecordRow::as_select())
            .load::<RecordRow>(self.conn)
            .map_err(WorkflowStoreError::persistence)?
            .into_iter()
            .map(row_to_record)
            .collect()
    }

    fn delete_review_records(
        &mut self,
        session_id: ReviewSessionId,
        reviewer_id: UserId,
    ) -> WorkflowStoreResult<usize> {
        diesel::delete(
            review_records::table
                .filter(review_records::session_id.eq(session_id.into_inner()))
                .filter(review_records::reviewer_id.eq(reviewer_id.into_inner())),
        )
        .execute(self.conn)
        .map_err(WorkflowStoreError::persistence)
    }

    fn append_change_log(&mut self, entry: &TaskChangeLog) -> WorkflowStoreResult<()> {
        diesel::insert_into(task_change_logs::table)
            .values(&change_log_to_row(entry))
            .execute(self.conn)
            .map_err(WorkflowStoreError::persistence)?;
        Ok(())
    }

    fn change_log(&mut self, task_id: TaskId) -> WorkflowStoreResult<Vec<TaskChangeLog>> {
        task_change_logs::table
            .filter(task_change_logs::task_id.eq(task_id.into_inner()))
            .order(task_change_logs::seq.asc())
            .select(ChangeLogRow::as_select())
            .load::<ChangeLogRow>(self.conn)
            .map_err(WorkflowStoreError::persistence)?
            .into_iter()
            .map(row_to_change_log)
            .collect()
    }
}
