//! Error types for artifact validation.

use thiserror::Error;

/// Errors returned while building artifact values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArtifactDomainError {
    /// Artifact content is empty after trimming.
    #[error("artifact content must not be empty")]
    EmptyContent,

    /// An execution plan was submitted without goals.
    #[error("execution plan must contain at least one goal")]
    EmptyGoals,

    /// A goal has a blank title.
    #[error("goal {goal_no} is missing a title")]
    GoalMissingTitle {
        /// One-based ordinal of the offending goal.
        goal_no: u32,
    },

    /// A goal has a blank description.
    #[error("goal {goal_no} is missing a description")]
    GoalMissingDescription {
        /// One-based ordinal of the offending goal.
        goal_no: u32,
    },

    /// More goals were supplied than the configured maximum.
    #[error("execution plan has {actual} goals, at most {max} are allowed")]
    TooManyGoals {
        /// Configured maximum.
        max: usize,
        /// Supplied goal count.
        actual: usize,
    },

    /// Artifact versions start at 1 and must fit in a `u32`.
    #[error("invalid artifact version: {0}")]
    InvalidVersion(i64),
}
