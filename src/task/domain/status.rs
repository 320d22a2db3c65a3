//! Task type and status codes.
//!
//! Each task type owns a fixed status set. The transition rule table decides
//! which moves between members of that set are legal; this module only
//! defines the vocabulary and set membership.

use super::ParseCodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work item, selecting its status set and rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Requirement work: solution and execution plan are reviewed before
    /// execution starts.
    Requirement,
    /// Generic unit task: accepted and executed without artifact review.
    #[serde(rename = "unit_task")]
    Unit,
}

const REQUIREMENT_STATUSES: &[TaskStatus] = &[
    TaskStatus::Unassigned,
    TaskStatus::PendingAccept,
    TaskStatus::Declined,
    TaskStatus::PendingSolution,
    TaskStatus::SolutionReview,
    TaskStatus::SolutionRejected,
    TaskStatus::PendingPlan,
    TaskStatus::PlanReview,
    TaskStatus::PlanRejected,
    TaskStatus::PendingStart,
    TaskStatus::InProgress,
    TaskStatus::Completed,
    TaskStatus::Cancelled,
];

const UNIT_STATUSES: &[TaskStatus] = &[
    TaskStatus::Unassigned,
    TaskStatus::PendingAccept,
    TaskStatus::PendingStart,
    TaskStatus::InProgress,
    TaskStatus::Completed,
    TaskStatus::Cancelled,
];

impl TaskType {
    /// All supported task types.
    pub const ALL: [Self; 2] = [Self::Requirement, Self::Unit];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requirement => "requirement",
            Self::Unit => "unit_task",
        }
    }

    /// Returns the status set defined for this task type.
    #[must_use]
    pub const fn statuses(self) -> &'static [TaskStatus] {
        match self {
            Self::Requirement => REQUIREMENT_STATUSES,
            Self::Unit => UNIT_STATUSES,
        }
    }

    /// Returns `true` when `status` belongs to this type's status set.
    #[must_use]
    pub fn defines(self, status: TaskStatus) -> bool {
        self.statuses().contains(&status)
    }

    /// Status reached when the executor accepts the assignment.
    #[must_use]
    pub const fn accept_status(self) -> TaskStatus {
        match self {
            Self::Requirement => TaskStatus::PendingSolution,
            Self::Unit => TaskStatus::PendingStart,
        }
    }

    /// Status reached when the executor rejects the assignment.
    ///
    /// Unit tasks go back to the unassigned pool; requirements keep their
    /// executor and wait for the creator to reassign.
    #[must_use]
    pub const fn reject_status(self) -> TaskStatus {
        match self {
            Self::Requirement => TaskStatus::Declined,
            Self::Unit => TaskStatus::Unassigned,
        }
    }

    /// Returns `true` when a rejected assignment releases the executor.
    #[must_use]
    pub const fn releases_executor_on_reject(self) -> bool {
        matches!(self, Self::Unit)
    }
}

impl TryFrom<&str> for TaskType {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "requirement" => Ok(Self::Requirement),
            "unit_task" => Ok(Self::Unit),
            _ => Err(ParseCodeError::new("task type", value)),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// No executor is assigned; the task sits in the pool.
    Unassigned,
    /// An executor is assigned and has not answered yet.
    PendingAccept,
    /// The executor turned the assignment down.
    Declined,
    /// Accepted; the executor owes a solution.
    PendingSolution,
    /// A solution version is under review.
    SolutionReview,
    /// The latest solution was rejected; a new version is expected.
    SolutionRejected,
    /// Solution approved; the executor owes an execution plan.
    PendingPlan,
    /// An execution plan version is under review.
    PlanReview,
    /// The latest execution plan was rejected; a new version is expected.
    PlanRejected,
    /// Ready to start execution.
    PendingStart,
    /// Execution under way.
    InProgress,
    /// Work finished.
    Completed,
    /// Work abandoned by the creator.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::PendingAccept => "pending_accept",
            Self::Declined => "declined",
            Self::PendingSolution => "pending_solution",
            Self::SolutionReview => "solution_review",
            Self::SolutionRejected => "solution_rejected",
            Self::PendingPlan => "pending_plan",
            Self::PlanReview => "plan_review",
            Self::PlanRejected => "plan_rejected",
            Self::PendingStart => "pending_start",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for statuses with no outgoing edges.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` for statuses that can only be entered through a
    /// dedicated workflow action (assignment or artifact submission).
    #[must_use]
    pub const fn is_action_gated(self) -> bool {
        matches!(
            self,
            Self::PendingAccept | Self::SolutionReview | Self::PlanReview
        )
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unassigned" => Ok(Self::Unassigned),
            "pending_accept" => Ok(Self::PendingAccept),
            "declined" => Ok(Self::Declined),
            "pending_solution" => Ok(Self::PendingSolution),
            "solution_review" => Ok(Self::SolutionReview),
            "solution_rejected" => Ok(Self::SolutionRejected),
            "pending_plan" => Ok(Self::PendingPlan),
            "plan_review" => Ok(Self::PlanReview),
            "plan_rejected" => Ok(Self::PlanRejected),
            "pending_start" => Ok(Self::PendingStart),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseCodeError::new("task status", value)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative urgency of a task or goal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal scheduling.
    #[default]
    Medium,
    /// Should be picked up soon.
    High,
    /// Drop other work.
    Urgent,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseCodeError::new("priority", value)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
