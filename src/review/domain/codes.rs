//! Review vocabulary: types, targets, modes, statuses and opinions.

use crate::artifact::domain::{PlanId, SolutionId};
use crate::task::domain::{ParseCodeError, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of approval round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    /// Review of a solution version.
    SolutionReview,
    /// Review of an execution plan version.
    ExecutionPlanReview,
    /// Review of the goal set attached to an execution plan version.
    GoalReview,
}

impl ReviewType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SolutionReview => "solution_review",
            Self::ExecutionPlanReview => "execution_plan_review",
            Self::GoalReview => "goal_review",
        }
    }

    /// Status the task must sit in while a session of this type is open.
    #[must_use]
    pub const fn gate_status(self) -> TaskStatus {
        match self {
            Self::SolutionReview => TaskStatus::SolutionReview,
            Self::ExecutionPlanReview | Self::GoalReview => TaskStatus::PlanReview,
        }
    }

    /// Artifact kind a session of this type targets.
    #[must_use]
    pub const fn target_kind(self) -> TargetKind {
        match self {
            Self::SolutionReview => TargetKind::Solution,
            Self::ExecutionPlanReview | Self::GoalReview => TargetKind::ExecutionPlan,
        }
    }

    /// Task status reached when a session of this type is finalised.
    #[must_use]
    pub const fn outcome(self, decision: ReviewDecision) -> TaskStatus {
        match (self, decision) {
            (Self::SolutionReview, ReviewDecision::Approved) => TaskStatus::PendingPlan,
            (Self::SolutionReview, ReviewDecision::Rejected) => TaskStatus::SolutionRejected,
            (Self::ExecutionPlanReview | Self::GoalReview, ReviewDecision::Approved) => {
                TaskStatus::PendingStart
            }
            (Self::ExecutionPlanReview | Self::GoalReview, ReviewDecision::Rejected) => {
                TaskStatus::PlanRejected
            }
        }
    }
}

impl TryFrom<&str> for ReviewType {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "solution_review" => Ok(Self::SolutionReview),
            "execution_plan_review" | "plan_review" => Ok(Self::ExecutionPlanReview),
            "goal_review" => Ok(Self::GoalReview),
            _ => Err(ParseCodeError::new("review type", value)),
        }
    }
}

impl fmt::Display for ReviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact kind a review session points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// A solution version.
    Solution,
    /// An execution plan version.
    ExecutionPlan,
}

impl TargetKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solution => "solution",
            Self::ExecutionPlan => "execution_plan",
        }
    }
}

impl TryFrom<&str> for TargetKind {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "solution" => Ok(Self::Solution),
            "execution_plan" => Ok(Self::ExecutionPlan),
            _ => Err(ParseCodeError::new("review target type", value)),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The artifact version a session reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target_type", content = "target_id", rename_all = "snake_case")]
pub enum ReviewTarget {
    /// A solution version.
    Solution(SolutionId),
    /// An execution plan version.
    ExecutionPlan(PlanId),
}

impl ReviewTarget {
    /// Returns the artifact kind.
    #[must_use]
    pub const fn kind(self) -> TargetKind {
        match self {
            Self::Solution(_) => TargetKind::Solution,
            Self::ExecutionPlan(_) => TargetKind::ExecutionPlan,
        }
    }

    /// Returns the raw artifact identifier.
    #[must_use]
    pub const fn id(self) -> Uuid {
        match self {
            Self::Solution(id) => id.into_inner(),
            Self::ExecutionPlan(id) => id.into_inner(),
        }
    }

    /// Rebuilds a target from its storage columns.
    #[must_use]
    pub const fn from_parts(kind: TargetKind, id: Uuid) -> Self {
        match kind {
            TargetKind::Solution => Self::Solution(SolutionId::from_uuid(id)),
            TargetKind::ExecutionPlan => Self::ExecutionPlan(PlanId::from_uuid(id)),
        }
    }
}

impl fmt::Display for ReviewTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Returns the canonical storage representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ParseCodeError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($code => Ok(Self::$variant),)+
                    _ => Err(ParseCodeError::new($label, value)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

code_enum! {
    /// How votes are collected in a session.
    ReviewMode, "review mode" {
        /// One reviewer; the creator decides.
        Single => "single",
        /// Invited jury members vote; the creator still decides.
        Jury => "jury",
    }
}

code_enum! {
    /// Lifecycle state of a review session.
    SessionStatus, "review session status" {
        /// Created but not yet accepting votes.
        Pending => "pending",
        /// Accepting votes and roster changes.
        InReview => "in_review",
        /// Finalised with a decision.
        Completed => "completed",
        /// Closed without a decision.
        Cancelled => "cancelled",
    }
}

code_enum! {
    /// Binding outcome of a finalised session.
    ReviewDecision, "review decision" {
        /// The artifact is accepted.
        Approved => "approved",
        /// The artifact must be reworked.
        Rejected => "rejected",
    }
}

code_enum! {
    /// A single reviewer's vote.
    Opinion, "review opinion" {
        /// In favour.
        Approve => "approve",
        /// Against.
        Reject => "reject",
        /// Neither.
        Abstain => "abstain",
    }
}

code_enum! {
    /// Capacity in which a review record was written.
    ReviewerRole, "reviewer role" {
        /// Jury member or single-mode reviewer.
        Jury => "jury",
        /// The task creator's binding decision.
        Creator => "creator",
    }
}

impl ReviewDecision {
    /// Maps the creator's boolean verdict to a decision.
    #[must_use]
    pub const fn from_approved(approved: bool) -> Self {
        if approved { Self::Approved } else { Self::Rejected }
    }
}

impl From<ReviewDecision> for Opinion {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => Self::Approve,
            ReviewDecision::Rejected => Self::Reject,
        }
    }
}
