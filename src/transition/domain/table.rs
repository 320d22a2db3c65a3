//! Rule table for one task type and the pure validation logic over it.

use super::{TransitionDenied, TransitionDomainError, TransitionRule};
use crate::task::domain::{RoleSet, TaskRole, TaskStatus, TaskType};

/// Validated set of transition rules for a single task type.
///
/// Validation never touches storage: the table is loaded once and then
/// consulted as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    task_type: TaskType,
    rules: Vec<TransitionRule>,
}

impl TransitionTable {
    /// Builds the table for `task_type` from `rules`.
    ///
    /// Rules belonging to other task types are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionDomainError::StatusOutsideType`] when a rule for
    /// `task_type` references a status outside its status set.
    pub fn new(
        task_type: TaskType,
        rules: impl IntoIterator<Item = TransitionRule>,
    ) -> Result<Self, TransitionDomainError> {
        let rules: Vec<TransitionRule> = rules
            .into_iter()
            .filter(|rule| rule.task_type() == task_type)
            .collect();

        if let Some(rule) = rules
            .iter()
            .find(|rule| !task_type.defines(rule.from()) || !task_type.defines(rule.to()))
        {
            return Err(TransitionDomainError::StatusOutsideType {
                task_type,
                from: rule.from(),
                to: rule.to(),
            });
        }

        Ok(Self { task_type, rules })
    }

    /// Returns the task type the table governs.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    /// Returns the rules in load order.
    #[must_use]
    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    /// Decides whether an actor holding `roles` may move a task from `from`
    /// to `to`, returning the first rule that opens the edge.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionDenied::NoEdge`] when no enabled rule connects the
    /// statuses, and [`TransitionDenied::RoleMismatch`] when enabled rules
    /// exist but none is open to `roles`.
    pub fn validate(
        &self,
        from: TaskStatus,
        to: TaskStatus,
        roles: &RoleSet,
    ) -> Result<&TransitionRule, TransitionDenied> {
        let mut candidates = self
            .rules
            .iter()
            .filter(|rule| rule.is_allowed() && rule.connects(from, to))
            .peekable();

        if candidates.peek().is_none() {
            return Err(TransitionDenied::NoEdge {
                task_type: self.task_type,
                from,
                to,
            });
        }

        let mut required: Vec<TaskRole> = Vec::new();
        for rule in candidates {
            if rule.permits(roles) {
                return Ok(rule);
            }
            if let Some(role) = rule.required_role()
                && !required.contains(&role)
            {
                required.push(role);
            }
        }

        Err(TransitionDenied::RoleMismatch {
            task_type: self.task_type,
            from,
            to,
            required,
            held: roles.clone(),
        })
    }

    /// Returns every status reachable from `from` for an actor holding
    /// `roles`, in the task type's status order.
    #[must_use]
    pub fn allowed_targets(&self, from: TaskStatus, roles: &RoleSet) -> Vec<TaskStatus> {
        self.task_type
            .statuses()
            .iter()
            .copied()
            .filter(|to| {
                self.rules
                    .iter()
                    .any(|rule| rule.connects(from, *to) && rule.permits(roles))
            })
            .collect()
    }
}
