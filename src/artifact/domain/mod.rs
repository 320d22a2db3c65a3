//! Versioned artifacts submitted by a task's executor.
//!
//! Solutions and execution plans share one versioning rule: per task and per
//! kind, versions run 1, 2, 3, ... and are never reused. An execution plan
//! owns its goals; a resubmission creates a new plan with a fresh goal set.

mod error;
mod ids;
mod plan;
mod solution;
mod status;
mod version;

pub use error::ArtifactDomainError;
pub use ids::{GoalId, PlanId, SolutionId};
pub use plan::{
    ExecutionPlan, Goal, GoalDraft, PersistedGoalData, PersistedPlanData, validate_goals,
};
pub use solution::{PersistedSolutionData, Solution};
pub use status::{ArtifactStatus, GoalStatus};
pub use version::ArtifactVersion;
