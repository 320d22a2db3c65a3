//! Error types for transition rules and validation.

use crate::task::domain::{RoleSet, TaskRole, TaskStatus, TaskType};
use thiserror::Error;

/// Errors raised while assembling a transition table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionDomainError {
    /// A rule references a status that the task type does not define.
    #[error("rule {from} -> {to} references a status outside task type '{task_type}'")]
    StatusOutsideType {
        /// Task type of the offending rule.
        task_type: TaskType,
        /// Source status of the offending rule.
        from: TaskStatus,
        /// Target status of the offending rule.
        to: TaskStatus,
    },
}

/// Reason a proposed status change was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionDenied {
    /// No enabled rule connects the two statuses.
    #[error("no {task_type} transition from {from} to {to}")]
    NoEdge {
        /// Task type consulted.
        task_type: TaskType,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Enabled rules exist but none is open to the actor's roles.
    #[error(
        "{task_type} transition from {from} to {to} requires {} but actor holds {held}",
        format_roles(.required)
    )]
    RoleMismatch {
        /// Task type consulted.
        task_type: TaskType,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
        /// Roles that would have opened the edge.
        required: Vec<TaskRole>,
        /// Roles the actor holds.
        held: RoleSet,
    },
}

fn format_roles(roles: &[TaskRole]) -> String {
    roles
        .iter()
        .copied()
        .map(TaskRole::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}
