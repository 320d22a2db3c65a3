//! Diesel row models for workflow persistence.
//!
//! Rows hold storage codes as plain strings; `conversion` maps them to and
//! from domain values.

use super::schema::{
    execution_plans, goals, review_records, review_sessions, solutions, task_change_logs,
    task_participants, tasks,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Task row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Task type code.
    pub task_type: String,
    /// Status code.
    pub status: String,
    /// Title.
    pub title: String,
    /// Creator.
    pub creator_id: Uuid,
    /// Executor.
    pub executor_id: Option<Uuid>,
    /// Parent task.
    pub parent_id: Option<Uuid>,
    /// Root task.
    pub root_id: Option<Uuid>,
    /// Priority code.
    pub priority: String,
    /// Advisory deadline in days.
    pub solution_deadline_days: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Participant row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_participants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ParticipantRow {
    /// Owning task.
    pub task_id: Uuid,
    /// Participating user.
    pub user_id: Uuid,
    /// Role code.
    pub role: String,
    /// Invitation status code.
    pub status: String,
    /// Inviting user.
    pub invited_by: Uuid,
    /// Invitation timestamp.
    pub invited_at: DateTime<Utc>,
}

/// Solution row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = solutions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SolutionRow {
    /// Solution identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Version number.
    pub version: i32,
    /// Body.
    pub content: String,
    /// Mind-map reference.
    pub mindmap_ref: Option<String>,
    /// Status code.
    pub status: String,
    /// Submitting user.
    pub submitted_by: Uuid,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
}

/// Execution plan row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = execution_plans)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlanRow {
    /// Plan identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Version number.
    pub version: i32,
    /// Body.
    pub content: String,
    /// Attachment reference.
    pub attachment_ref: Option<String>,
    /// Status code.
    pub status: String,
    /// Submitting user.
    pub submitted_by: Uuid,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
}

/// Goal row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = goals)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GoalRow {
    /// Goal identifier.
    pub id: Uuid,
    /// Owning plan.
    pub plan_id: Uuid,
    /// Ordinal.
    pub goal_no: i32,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Acceptance criteria.
    pub acceptance_criteria: Option<String>,
    /// Priority code.
    pub priority: String,
    /// Progress code.
    pub status: String,
}

/// Review session row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = review_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    /// Session identifier.
    pub id: Uuid,
    /// Task under review.
    pub task_id: Uuid,
    /// Review type code.
    pub review_type: String,
    /// Target kind code.
    pub target_type: String,
    /// Target identifier.
    pub target_id: Uuid,
    /// Mode code.
    pub review_mode: String,
    /// Advisory quorum.
    pub required_approvals: i32,
    /// Status code.
    pub status: String,
    /// Opening user.
    pub initiated_by: Uuid,
    /// Opening timestamp.
    pub initiated_at: DateTime<Utc>,
    /// Decision code.
    pub final_decision: Option<String>,
    /// Closing user.
    pub decided_by: Option<Uuid>,
    /// Closing timestamp.
    pub decided_at: Option<DateTime<Utc>>,
    /// Decision comment.
    pub decision_comment: Option<String>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Review record row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = review_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecordRow {
    /// Record identifier.
    pub id: Uuid,
    /// Session voted in.
    pub session_id: Uuid,
    /// Voting user.
    pub reviewer_id: Uuid,
    /// Reviewer role code.
    pub reviewer_role: String,
    /// Opinion code.
    pub opinion: String,
    /// Score.
    pub score: Option<i16>,
    /// Weight.
    pub weight: f64,
    /// Remark.
    pub comment: Option<String>,
    /// Vote timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for change-log entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_change_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChangeLogRow {
    /// Entry identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Acting user.
    pub actor_id: Uuid,
    /// Change type code.
    pub change_type: String,
    /// Changed field.
    pub field_name: Option<String>,
    /// Value before.
    pub old_value: Option<String>,
    /// Value after.
    pub new_value: Option<String>,
    /// Comment.
    pub comment: Option<String>,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for change-log entries; `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_change_logs)]
pub struct NewChangeLogRow {
    /// Entry identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Acting user.
    pub actor_id: Uuid,
    /// Change type code.
    pub change_type: String,
    /// Changed field.
    pub field_name: Option<String>,
    /// Value before.
    pub old_value: Option<String>,
    /// Value after.
    pub new_value: Option<String>,
    /// Comment.
    pub comment: Option<String>,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}
