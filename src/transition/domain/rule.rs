//! Transition rule rows.

use crate::task::domain::{RoleSet, TaskRole, TaskStatus, TaskType};
use serde::{Deserialize, Serialize};

/// One allowed (or explicitly disallowed) status edge for a task type.
///
/// Several rules may share the same `(task_type, from, to)` key with
/// different required roles; the edge is open to an actor when any of them
/// permits the actor's role set.
///
/// # Examples
///
/// ```
/// use stagegate::task::domain::{RoleSet, TaskRole, TaskStatus, TaskType};
/// use stagegate::transition::domain::TransitionRule;
///
/// let rule = TransitionRule::new(
///     TaskType::Unit,
///     TaskStatus::PendingStart,
///     TaskStatus::InProgress,
/// )
/// .with_required_role(TaskRole::Executor);
///
/// assert!(rule.permits(&RoleSet::from_roles([TaskRole::Executor])));
/// assert!(!rule.permits(&RoleSet::from_roles([TaskRole::Creator])));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionRule {
    task_type: TaskType,
    from: TaskStatus,
    to: TaskStatus,
    required_role: Option<TaskRole>,
    requires_approval: bool,
    is_allowed: bool,
}

impl TransitionRule {
    /// Creates an allowed edge open to any role, without approval.
    #[must_use]
    pub const fn new(task_type: TaskType, from: TaskStatus, to: TaskStatus) -> Self {
        Self {
            task_type,
            from,
            to,
            required_role: None,
            requires_approval: false,
            is_allowed: true,
        }
    }

    /// Restricts the edge to actors holding `role`.
    #[must_use]
    pub const fn with_required_role(mut self, role: TaskRole) -> Self {
        self.required_role = Some(role);
        self
    }

    /// Marks the edge as reachable only through a review decision.
    #[must_use]
    pub const fn requiring_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }

    /// Sets whether the edge is enabled.
    #[must_use]
    pub const fn with_allowed(mut self, is_allowed: bool) -> Self {
        self.is_allowed = is_allowed;
        self
    }

    /// Returns the task type the rule belongs to.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the source status.
    #[must_use]
    pub const fn from(&self) -> TaskStatus {
        self.from
    }

    /// Returns the target status.
    #[must_use]
    pub const fn to(&self) -> TaskStatus {
        self.to
    }

    /// Returns the role required to take the edge, if any.
    #[must_use]
    pub const fn required_role(&self) -> Option<TaskRole> {
        self.required_role
    }

    /// Returns `true` when the edge is taken through a review decision.
    #[must_use]
    pub const fn requires_approval(&self) -> bool {
        self.requires_approval
    }

    /// Returns `true` when the edge is enabled.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.is_allowed
    }

    /// Returns `true` when the rule connects `from` to `to`.
    #[must_use]
    pub fn connects(&self, from: TaskStatus, to: TaskStatus) -> bool {
        self.from == from && self.to == to
    }

    /// Returns `true` when the rule is enabled and open to `roles`.
    #[must_use]
    pub fn permits(&self, roles: &RoleSet) -> bool {
        self.is_allowed && self.required_role.is_none_or(|role| roles.contains(role))
    }
}
