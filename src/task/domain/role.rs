//! Actor roles relative to a task.
//!
//! Roles are never carried in a session token. They are re-derived for each
//! request by comparing the acting user against the task and its
//! participant rows.

use super::{ParseCodeError, ParticipantRole, Task, TaskParticipant, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Role an actor can hold on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskRole {
    /// Created the task and holds final review authority.
    Creator,
    /// Assigned to do the work.
    Executor,
    /// Invited to vote in jury reviews.
    Jury,
    /// Any other user.
    Observer,
}

impl TaskRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Executor => "executor",
            Self::Jury => "jury",
            Self::Observer => "observer",
        }
    }
}

impl TryFrom<&str> for TaskRole {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "creator" => Ok(Self::Creator),
            "executor" => Ok(Self::Executor),
            // `reviewer` is accepted as a legacy alias of `jury`.
            "jury" | "reviewer" => Ok(Self::Jury),
            "observer" => Ok(Self::Observer),
            _ => Err(ParseCodeError::new("task role", value)),
        }
    }
}

impl fmt::Display for TaskRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of roles an actor holds on one task.
///
/// # Examples
///
/// ```
/// use stagegate::task::domain::{RoleSet, TaskRole};
///
/// let roles = RoleSet::from_roles([TaskRole::Creator, TaskRole::Jury]);
/// assert!(roles.contains(TaskRole::Jury));
/// assert!(!roles.contains(TaskRole::Executor));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<TaskRole>);

impl RoleSet {
    /// Builds a role set from any collection of roles.
    #[must_use]
    pub fn from_roles(roles: impl IntoIterator<Item = TaskRole>) -> Self {
        Self(roles.into_iter().collect())
    }

    /// Returns `true` when the set contains `role`.
    #[must_use]
    pub fn contains(&self, role: TaskRole) -> bool {
        self.0.contains(&role)
    }

    /// Returns `true` when the actor holds no role beyond observer.
    #[must_use]
    pub fn is_observer_only(&self) -> bool {
        self.0.iter().all(|role| *role == TaskRole::Observer)
    }

    /// Iterates the roles in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = TaskRole> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(TaskRole::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Computes the roles `actor` holds on `task`.
///
/// Creator and executor come from the task row. Jury membership comes from
/// participant rows for this task with the jury role that have not been
/// rejected. An actor matching none of these is an observer.
#[must_use]
pub fn derive_roles(task: &Task, participants: &[TaskParticipant], actor: UserId) -> RoleSet {
    let mut roles = BTreeSet::new();
    if task.is_creator(actor) {
        roles.insert(TaskRole::Creator);
    }
    if task.is_executor(actor) {
        roles.insert(TaskRole::Executor);
    }
    let is_juror = participants.iter().any(|participant| {
        participant.task_id() == task.id()
            && participant.user_id() == actor
            && participant.role() == ParticipantRole::Jury
            && participant.is_active()
    });
    if is_juror {
        roles.insert(TaskRole::Jury);
    }
    if roles.is_empty() {
        roles.insert(TaskRole::Observer);
    }
    RoleSet(roles)
}
