//! Request payloads and result bundles for workflow operations.

use crate::artifact::domain::{ExecutionPlan, GoalDraft, Solution};
use crate::review::domain::{
    Opinion, ReviewMode, ReviewSession, ReviewSessionId, ReviewTarget, ReviewType,
};
use crate::task::domain::{Priority, Task, TaskDraft, TaskId, TaskType, UserId};

/// Request payload for registering a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(super) draft: TaskDraft,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields and medium priority.
    #[must_use]
    pub fn new(task_type: TaskType, title: impl Into<String>, creator_id: UserId) -> Self {
        Self {
            draft: TaskDraft {
                task_type,
                title: title.into(),
                creator_id,
                executor_id: None,
                parent_id: None,
                root_id: None,
                priority: Priority::default(),
                solution_deadline_days: None,
            },
        }
    }

    /// Names the executor up front.
    #[must_use]
    pub const fn with_executor(mut self, executor_id: UserId) -> Self {
        self.draft.executor_id = Some(executor_id);
        self
    }

    /// Places the task in a hierarchy.
    #[must_use]
    pub const fn with_parent(mut self, parent_id: TaskId, root_id: TaskId) -> Self {
        self.draft.parent_id = Some(parent_id);
        self.draft.root_id = Some(root_id);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.draft.priority = priority;
        self
    }

    /// Sets the advisory solution deadline in days.
    #[must_use]
    pub const fn with_solution_deadline_days(mut self, days: u32) -> Self {
        self.draft.solution_deadline_days = Some(days);
        self
    }
}

/// Request payload for submitting a solution version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitSolutionRequest {
    pub(super) task_id: TaskId,
    pub(super) actor: UserId,
    pub(super) content: String,
    pub(super) mindmap_ref: Option<String>,
}

impl SubmitSolutionRequest {
    /// Creates a request with the solution body.
    #[must_use]
    pub fn new(task_id: TaskId, actor: UserId, content: impl Into<String>) -> Self {
        Self {
            task_id,
            actor,
            content: content.into(),
            mindmap_ref: None,
        }
    }

    /// Attaches a mind-map reference returned by file storage.
    #[must_use]
    pub fn with_mindmap_ref(mut self, mindmap_ref: impl Into<String>) -> Self {
        self.mindmap_ref = Some(mindmap_ref.into());
        self
    }
}

/// Request payload for submitting an execution plan version with goals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitExecutionPlanRequest {
    pub(super) task_id: TaskId,
    pub(super) actor: UserId,
    pub(super) content: String,
    pub(super) attachment_ref: Option<String>,
    pub(super) goals: Vec<GoalDraft>,
}

impl SubmitExecutionPlanRequest {
    /// Creates a request with the plan body and its goals.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        actor: UserId,
        content: impl Into<String>,
        goals: impl IntoIterator<Item = GoalDraft>,
    ) -> Self {
        Self {
            task_id,
            actor,
            content: content.into(),
            attachment_ref: None,
            goals: goals.into_iter().collect(),
        }
    }

    /// Attaches a file reference returned by file storage.
    #[must_use]
    pub fn with_attachment_ref(mut self, attachment_ref: impl Into<String>) -> Self {
        self.attachment_ref = Some(attachment_ref.into());
        self
    }
}

/// Request payload for explicitly opening a review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateReviewRequest {
    pub(super) task_id: TaskId,
    pub(super) actor: UserId,
    pub(super) review_type: ReviewType,
    pub(super) target: ReviewTarget,
    pub(super) mode: ReviewMode,
    pub(super) jury: Vec<UserId>,
    pub(super) required_approvals: Option<u32>,
}

impl InitiateReviewRequest {
    /// Creates a single-mode review request.
    #[must_use]
    pub const fn new(
        task_id: TaskId,
        actor: UserId,
        review_type: ReviewType,
        target: ReviewTarget,
    ) -> Self {
        Self {
            task_id,
            actor,
            review_type,
            target,
            mode: ReviewMode::Single,
            jury: Vec::new(),
            required_approvals: None,
        }
    }

    /// Switches the request to jury mode with the given members.
    #[must_use]
    pub fn with_jury(mut self, members: impl IntoIterator<Item = UserId>) -> Self {
        self.mode = ReviewMode::Jury;
        self.jury = members.into_iter().collect();
        self
    }

    /// Sets the advisory approval quorum.
    #[must_use]
    pub const fn with_required_approvals(mut self, required_approvals: u32) -> Self {
        self.required_approvals = Some(required_approvals);
        self
    }
}

/// Request payload for casting a vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOpinionRequest {
    pub(super) session_id: ReviewSessionId,
    pub(super) actor: UserId,
    pub(super) opinion: Opinion,
    pub(super) comment: Option<String>,
    pub(super) score: Option<u8>,
}

impl ReviewOpinionRequest {
    /// Creates a vote without comment or score.
    #[must_use]
    pub const fn new(session_id: ReviewSessionId, actor: UserId, opinion: Opinion) -> Self {
        Self {
            session_id,
            actor,
            opinion,
            comment: None,
            score: None,
        }
    }

    /// Adds a remark.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds a score out of 100.
    #[must_use]
    pub const fn with_score(mut self, score: u8) -> Self {
        self.score = Some(score);
        self
    }
}

/// Request payload for the creator's binding review decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReviewRequest {
    pub(super) session_id: ReviewSessionId,
    pub(super) actor: UserId,
    pub(super) approved: bool,
    pub(super) comment: Option<String>,
}

impl FinalizeReviewRequest {
    /// Creates a decision without comment.
    #[must_use]
    pub const fn new(session_id: ReviewSessionId, actor: UserId, approved: bool) -> Self {
        Self {
            session_id,
            actor,
            approved,
            comment: None,
        }
    }

    /// Adds a remark recorded on the session and the change log.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Result of a solution submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedSolution {
    /// The new solution version.
    pub solution: Solution,
    /// The review session opened for it.
    pub session: ReviewSession,
}

/// Result of an execution plan submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedPlan {
    /// The new plan version with its goals.
    pub plan: ExecutionPlan,
    /// The review session opened for it.
    pub session: ReviewSession,
}

/// Result of a review finalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedReview {
    /// The closed session.
    pub session: ReviewSession,
    /// The task after its status change.
    pub task: Task,
}
