//! Append-only audit entries recorded for every task mutation.

use super::{ChangeLogId, ParseCodeError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change captured by a change-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Task registered.
    Created,
    /// Status moved along a rule edge.
    StatusChange,
    /// A plain field changed (executor assignment, for example).
    FieldUpdate,
    /// A solution version was submitted.
    SolutionSubmitted,
    /// An execution plan version was submitted with its goals.
    PlanSubmitted,
    /// A review session was opened.
    ReviewInitiated,
    /// A reviewer cast a vote.
    ReviewOpinion,
    /// The creator closed a review with a decision.
    ReviewFinalized,
    /// A review session was cancelled.
    ReviewCancelled,
    /// Jury members were invited.
    JuryInvited,
    /// A jury member was removed.
    JuryRemoved,
}

impl ChangeType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChange => "status_change",
            Self::FieldUpdate => "field_update",
            Self::SolutionSubmitted => "solution_submitted",
            Self::PlanSubmitted => "plan_submitted",
            Self::ReviewInitiated => "review_initiated",
            Self::ReviewOpinion => "review_opinion",
            Self::ReviewFinalized => "review_finalized",
            Self::ReviewCancelled => "review_cancelled",
            Self::JuryInvited => "jury_invited",
            Self::JuryRemoved => "jury_removed",
        }
    }
}

impl TryFrom<&str> for ChangeType {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "status_change" => Ok(Self::StatusChange),
            "field_update" => Ok(Self::FieldUpdate),
            "solution_submitted" => Ok(Self::SolutionSubmitted),
            "plan_submitted" => Ok(Self::PlanSubmitted),
            "review_initiated" => Ok(Self::ReviewInitiated),
            "review_opinion" => Ok(Self::ReviewOpinion),
            "review_finalized" => Ok(Self::ReviewFinalized),
            "review_cancelled" => Ok(Self::ReviewCancelled),
            "jury_invited" => Ok(Self::JuryInvited),
            "jury_removed" => Ok(Self::JuryRemoved),
            _ => Err(ParseCodeError::new("change type", value)),
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One append-only audit entry.
///
/// # Examples
///
/// ```
/// use stagegate::task::domain::{ChangeType, TaskChangeLog, TaskId, UserId};
/// use mockable::DefaultClock;
///
/// let entry = TaskChangeLog::new(TaskId::new(), UserId::new(), ChangeType::StatusChange, &DefaultClock)
///     .with_field("status", Some("pending_accept"), Some("pending_solution"));
/// assert_eq!(entry.field_name(), Some("status"));
/// assert_eq!(entry.new_value(), Some("pending_solution"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChangeLog {
    id: ChangeLogId,
    task_id: TaskId,
    actor_id: UserId,
    change_type: ChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted change-log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedChangeLogData {
    /// Entry identifier.
    pub id: ChangeLogId,
    /// Task the entry belongs to.
    pub task_id: TaskId,
    /// Acting user.
    pub actor_id: UserId,
    /// Kind of change.
    pub change_type: ChangeType,
    /// Changed field, if the entry describes a field change.
    pub field_name: Option<String>,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change.
    pub new_value: Option<String>,
    /// Free-text comment.
    pub comment: Option<String>,
    /// Entry timestamp.
    pub created_at: DateTime<Utc>,
}

impl TaskChangeLog {
    /// Creates an entry with no field details.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        actor_id: UserId,
        change_type: ChangeType,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: ChangeLogId::new(),
            task_id,
            actor_id,
            change_type,
            field_name: None,
            old_value: None,
            new_value: None,
            comment: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedChangeLogData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            actor_id: data.actor_id,
            change_type: data.change_type,
            field_name: data.field_name,
            old_value: data.old_value,
            new_value: data.new_value,
            comment: data.comment,
            created_at: data.created_at,
        }
    }

    /// Records the changed field with its before and after values.
    #[must_use]
    pub fn with_field(
        mut self,
        field_name: impl Into<String>,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> Self {
        self.field_name = Some(field_name.into());
        self.old_value = old_value.map(str::to_owned);
        self.new_value = new_value.map(str::to_owned);
        self
    }

    /// Attaches a comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> ChangeLogId {
        self.id
    }

    /// Returns the task the entry belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn actor_id(&self) -> UserId {
        self.actor_id
    }

    /// Returns the kind of change.
    #[must_use]
    pub const fn change_type(&self) -> ChangeType {
        self.change_type
    }

    /// Returns the changed field name.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }

    /// Returns the value before the change.
    #[must_use]
    pub fn old_value(&self) -> Option<&str> {
        self.old_value.as_deref()
    }

    /// Returns the value after the change.
    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    /// Returns the comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the entry timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
