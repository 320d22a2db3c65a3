//! Error taxonomy for workflow operations.

use crate::artifact::domain::{ArtifactDomainError, PlanId, SolutionId};
use crate::review::domain::{ReviewDomainError, ReviewSessionId, ReviewTarget};
use crate::task::domain::{TaskDomainError, TaskId, TaskRole, TaskStatus, UserId};
use crate::transition::{domain::TransitionDenied, services::TransitionError};
use crate::workflow::ports::WorkflowStoreError;
use std::fmt;
use thiserror::Error;

/// Coarse classification of a [`WorkflowError`] for transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowErrorKind {
    /// A referenced task, session or artifact does not exist.
    NotFound,
    /// The actor lacks the role the operation requires.
    Unauthorized,
    /// The current state does not permit the operation.
    InvalidState,
    /// The operation collides with existing data.
    Conflict,
    /// The input is structurally invalid.
    Validation,
    /// Storage or reference data failed.
    Storage,
}

impl WorkflowErrorKind {
    /// Returns a stable machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::InvalidState => "invalid_state",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for WorkflowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structurally invalid operation input, detected before storage is touched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A text field exceeds the configured length.
    #[error("{field} exceeds {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Configured maximum.
        max: usize,
    },

    /// No jury members were supplied.
    #[error("at least one jury member is required")]
    EmptyJury,

    /// More jury members were supplied than allowed.
    #[error("at most {max} jury members may be invited at once, got {actual}")]
    TooManyJurors {
        /// Configured maximum.
        max: usize,
        /// Supplied count.
        actual: usize,
    },

    /// The task creator was listed as a juror.
    #[error("the task creator decides the review and cannot sit on its jury")]
    CreatorAsJuror,
}

/// Errors returned by workflow operations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The review session does not exist.
    #[error("review session not found: {0}")]
    SessionNotFound(ReviewSessionId),

    /// The solution does not exist.
    #[error("solution not found: {0}")]
    SolutionNotFound(SolutionId),

    /// The execution plan does not exist.
    #[error("execution plan not found: {0}")]
    PlanNotFound(PlanId),

    /// The user is not a jury member of the session's task.
    #[error("user {user_id} is not a jury member for session {session_id}")]
    JuryMemberNotFound {
        /// Session addressed.
        session_id: ReviewSessionId,
        /// User addressed.
        user_id: UserId,
    },

    /// The actor does not hold the role the operation requires.
    #[error("user {actor} must be the task {required} to {action}")]
    Unauthorized {
        /// Acting user.
        actor: UserId,
        /// Attempted operation.
        action: &'static str,
        /// Role the operation requires.
        required: TaskRole,
    },

    /// The rule table refused the status change.
    #[error(transparent)]
    Transition(TransitionDenied),

    /// The task status does not permit the operation.
    #[error("cannot {action} task {task_id} while it is {status}")]
    UnexpectedStatus {
        /// Task addressed.
        task_id: TaskId,
        /// Attempted operation.
        action: &'static str,
        /// Current status.
        status: TaskStatus,
    },

    /// The edge is only taken through a dedicated operation.
    #[error("task {task_id} moves from {from} to {to} only through its workflow action")]
    DedicatedActionRequired {
        /// Task addressed.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The review target belongs to another task.
    #[error("review target {target} does not belong to task {task_id}")]
    TargetNotInTask {
        /// Task addressed.
        task_id: TaskId,
        /// Requested target.
        target: ReviewTarget,
    },

    /// The target is a superseded or already decided artifact version.
    #[error("review target {target} is not the latest pending version of task {task_id}")]
    StaleTarget {
        /// Task addressed.
        task_id: TaskId,
        /// Requested target.
        target: ReviewTarget,
    },

    /// Another session of the task is still in review.
    #[error("session {session_id} cannot close while session {open_session_id} is in review")]
    OtherReviewOpen {
        /// Session addressed.
        session_id: ReviewSessionId,
        /// Session still in review.
        open_session_id: ReviewSessionId,
    },

    /// A session is already in review for the target.
    #[error("session {session_id} is already reviewing {target}")]
    ReviewAlreadyOpen {
        /// Target addressed.
        target: ReviewTarget,
        /// Session in review.
        session_id: ReviewSessionId,
    },

    /// The reviewer already voted in the session.
    #[error("reviewer {reviewer_id} already voted in session {session_id}")]
    AlreadyVoted {
        /// Session voted in.
        session_id: ReviewSessionId,
        /// Voting user.
        reviewer_id: UserId,
    },

    /// Operation input is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Task domain rule violated.
    #[error(transparent)]
    Task(#[from] TaskDomainError),

    /// Artifact domain rule violated.
    #[error(transparent)]
    Artifact(#[from] ArtifactDomainError),

    /// Review domain rule violated.
    #[error(transparent)]
    Review(#[from] ReviewDomainError),

    /// Storage failed.
    #[error(transparent)]
    Store(WorkflowStoreError),

    /// Transition rules could not be loaded.
    #[error(transparent)]
    Rules(TransitionError),
}

impl WorkflowError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> WorkflowErrorKind {
        match self {
            Self::TaskNotFound(_)
            | Self::SessionNotFound(_)
            | Self::SolutionNotFound(_)
            | Self::PlanNotFound(_)
            | Self::JuryMemberNotFound { .. }
            | Self::TargetNotInTask { .. } => WorkflowErrorKind::NotFound,
            Self::Unauthorized { .. }
            | Self::Transition(TransitionDenied::RoleMismatch { .. }) => {
                WorkflowErrorKind::Unauthorized
            }
            Self::Transition(TransitionDenied::NoEdge { .. })
            | Self::UnexpectedStatus { .. }
            | Self::DedicatedActionRequired { .. }
            | Self::StaleTarget { .. }
            | Self::OtherReviewOpen { .. }
            | Self::Task(TaskDomainError::StatusNotInType { .. })
            | Self::Review(ReviewDomainError::SessionNotOpen { .. })
            | Self::Artifact(ArtifactDomainError::InvalidVersion(_)) => {
                WorkflowErrorKind::InvalidState
            }
            Self::ReviewAlreadyOpen { .. }
            | Self::AlreadyVoted { .. }
            | Self::Store(
                WorkflowStoreError::DuplicateTask(_)
                | WorkflowStoreError::DuplicateParticipant { .. }
                | WorkflowStoreError::DuplicateArtifactVersion { .. }
                | WorkflowStoreError::DuplicateReviewRecord { .. }
                | WorkflowStoreError::DuplicateOpenSession { .. },
            ) => WorkflowErrorKind::Conflict,
            Self::Validation(_)
            | Self::Task(_)
            | Self::Artifact(_)
            | Self::Review(_) => WorkflowErrorKind::Validation,
            Self::Store(_) | Self::Rules(_) => WorkflowErrorKind::Storage,
        }
    }
}

impl From<TransitionDenied> for WorkflowError {
    fn from(denied: TransitionDenied) -> Self {
        Self::Transition(denied)
    }
}

impl From<TransitionError> for WorkflowError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Denied(denied) => Self::Transition(denied),
            other @ (TransitionError::InvalidRules(_) | TransitionError::Store(_)) => {
                Self::Rules(other)
            }
        }
    }
}

impl From<WorkflowStoreError> for WorkflowError {
    fn from(err: WorkflowStoreError) -> Self {
        match err {
            WorkflowStoreError::DuplicateReviewRecord {
                session_id,
                reviewer_id,
            } => Self::AlreadyVoted {
                session_id,
                reviewer_id,
            },
            other => Self::Store(other),
        }
    }
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
