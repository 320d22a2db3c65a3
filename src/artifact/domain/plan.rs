//! Execution plan versions and their goals.

use super::{ArtifactDomainError, ArtifactStatus, ArtifactVersion, GoalId, GoalStatus, PlanId};
use crate::task::domain::{Priority, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Goal fields supplied with a plan submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoalDraft {
    /// Short goal title.
    pub title: String,
    /// What the goal covers.
    pub description: String,
    /// How completion is judged.
    pub acceptance_criteria: Option<String>,
    /// Relative urgency.
    pub priority: Priority,
}

impl GoalDraft {
    /// Creates a draft with medium priority and no acceptance criteria.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            acceptance_criteria: None,
            priority: Priority::default(),
        }
    }

    /// Sets the acceptance criteria.
    #[must_use]
    pub fn with_acceptance_criteria(mut self, criteria: impl Into<String>) -> Self {
        self.acceptance_criteria = Some(criteria.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Checks a goal list before any storage work happens.
///
/// # Errors
///
/// Returns [`ArtifactDomainError::EmptyGoals`] for an empty list,
/// [`ArtifactDomainError::TooManyGoals`] above `max_goals`, and
/// [`ArtifactDomainError::GoalMissingTitle`] or
/// [`ArtifactDomainError::GoalMissingDescription`] for the first goal with a
/// blank field.
pub fn validate_goals(goals: &[GoalDraft], max_goals: usize) -> Result<(), ArtifactDomainError> {
    if goals.is_empty() {
        return Err(ArtifactDomainError::EmptyGoals);
    }
    if goals.len() > max_goals {
        return Err(ArtifactDomainError::TooManyGoals {
            max: max_goals,
            actual: goals.len(),
        });
    }
    for (goal_no, goal) in (1_u32..).zip(goals) {
        if goal.title.trim().is_empty() {
            return Err(ArtifactDomainError::GoalMissingTitle { goal_no });
        }
        if goal.description.trim().is_empty() {
            return Err(ArtifactDomainError::GoalMissingDescription { goal_no });
        }
    }
    Ok(())
}

/// One goal of an execution plan version. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    id: GoalId,
    plan_id: PlanId,
    goal_no: u32,
    title: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    acceptance_criteria: Option<String>,
    priority: Priority,
    status: GoalStatus,
}

/// Parameter object for reconstructing a persisted goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedGoalData {
    /// Goal identifier.
    pub id: GoalId,
    /// Owning plan version.
    pub plan_id: PlanId,
    /// One-based ordinal within the plan.
    pub goal_no: u32,
    /// Goal title.
    pub title: String,
    /// Goal description.
    pub description: String,
    /// Acceptance criteria.
    pub acceptance_criteria: Option<String>,
    /// Relative urgency.
    pub priority: Priority,
    /// Progress.
    pub status: GoalStatus,
}

impl Goal {
    /// Reconstructs a goal from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedGoalData) -> Self {
        Self {
            id: data.id,
            plan_id: data.plan_id,
            goal_no: data.goal_no,
            title: data.title,
            description: data.description,
            acceptance_criteria: data.acceptance_criteria,
            priority: data.priority,
            status: data.status,
        }
    }

    /// Returns the goal identifier.
    #[must_use]
    pub const fn id(&self) -> GoalId {
        self.id
    }

    /// Returns the owning plan version.
    #[must_use]
    pub const fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    /// Returns the one-based ordinal within the plan.
    #[must_use]
    pub const fn goal_no(&self) -> u32 {
        self.goal_no
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the acceptance criteria.
    #[must_use]
    pub fn acceptance_criteria(&self) -> Option<&str> {
        self.acceptance_criteria.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the progress status.
    #[must_use]
    pub const fn status(&self) -> GoalStatus {
        self.status
    }
}

/// One submitted version of a task's execution plan, owning its goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    id: PlanId,
    task_id: TaskId,
    version: ArtifactVersion,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment_ref: Option<String>,
    status: ArtifactStatus,
    submitted_by: UserId,
    submitted_at: DateTime<Utc>,
    goals: Vec<Goal>,
}

/// Parameter object for reconstructing a persisted execution plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPlanData {
    /// Plan identifier.
    pub id: PlanId,
    /// Owning task.
    pub task_id: TaskId,
    /// Per-task version.
    pub version: ArtifactVersion,
    /// Plan body.
    pub content: String,
    /// Opaque reference to an attached file.
    pub attachment_ref: Option<String>,
    /// Review outcome.
    pub status: ArtifactStatus,
    /// Submitting user.
    pub submitted_by: UserId,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
    /// Goals ordered by ordinal.
    pub goals: Vec<Goal>,
}

impl ExecutionPlan {
    /// Creates a pending plan version together with its goals.
    ///
    /// Goals are numbered from 1 in the order supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactDomainError::EmptyContent`] for blank content and
    /// any error from [`validate_goals`].
    pub fn submit(
        task_id: TaskId,
        version: ArtifactVersion,
        content: impl Into<String>,
        goals: Vec<GoalDraft>,
        max_goals: usize,
        submitted_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ArtifactDomainError> {
        let body: String = content.into();
        if body.trim().is_empty() {
            return Err(ArtifactDomainError::EmptyContent);
        }
        validate_goals(&goals, max_goals)?;

        let id = PlanId::new();
        let numbered = (1_u32..)
            .zip(goals)
            .map(|(goal_no, draft)| Goal {
                id: GoalId::new(),
                plan_id: id,
                goal_no,
                title: draft.title.trim().to_owned(),
                description: draft.description,
                acceptance_criteria: draft.acceptance_criteria,
                priority: draft.priority,
                status: GoalStatus::Pending,
            })
            .collect();

        Ok(Self {
            id,
            task_id,
            version,
            content: body,
            attachment_ref: None,
            status: ArtifactStatus::Pending,
            submitted_by,
            submitted_at: clock.utc(),
            goals: numbered,
        })
    }

    /// Attaches a file reference.
    #[must_use]
    pub fn with_attachment_ref(mut self, attachment_ref: Option<String>) -> Self {
        self.attachment_ref = attachment_ref;
        self
    }

    /// Reconstructs a plan from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPlanData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            version: data.version,
            content: data.content,
            attachment_ref: data.attachment_ref,
            status: data.status,
            submitted_by: data.submitted_by,
            submitted_at: data.submitted_at,
            goals: data.goals,
        }
    }

    /// Returns the plan identifier.
    #[must_use]
    pub const fn id(&self) -> PlanId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the per-task version.
    #[must_use]
    pub const fn version(&self) -> ArtifactVersion {
        self.version
    }

    /// Returns the plan body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the attachment reference.
    #[must_use]
    pub fn attachment_ref(&self) -> Option<&str> {
        self.attachment_ref.as_deref()
    }

    /// Returns the review outcome.
    #[must_use]
    pub const fn status(&self) -> ArtifactStatus {
        self.status
    }

    /// Returns the submitting user.
    #[must_use]
    pub const fn submitted_by(&self) -> UserId {
        self.submitted_by
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns the goals ordered by ordinal.
    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Records the review outcome.
    pub const fn settle(&mut self, status: ArtifactStatus) {
        self.status = status;
    }
}
