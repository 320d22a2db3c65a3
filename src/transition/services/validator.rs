//! Transition validator backed by a rule store.

use crate::task::domain::{RoleSet, TaskStatus, TaskType};
use crate::transition::{
    domain::{TransitionDenied, TransitionDomainError, TransitionRule, TransitionTable},
    ports::{TransitionRuleStore, TransitionRuleStoreError},
};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`TransitionValidator`].
#[derive(Debug, Clone, Error)]
pub enum TransitionError {
    /// The proposed transition is not permitted.
    #[error(transparent)]
    Denied(#[from] TransitionDenied),
    /// The stored rules do not form a valid table.
    #[error(transparent)]
    InvalidRules(#[from] TransitionDomainError),
    /// The rule store failed.
    #[error(transparent)]
    Store(#[from] TransitionRuleStoreError),
}

/// Result type for transition validation.
pub type TransitionResult<T> = Result<T, TransitionError>;

/// Answers transition questions against the rules in a store.
///
/// Read-only: no operation here has side effects.
#[derive(Debug)]
pub struct TransitionValidator<R>
where
    R: TransitionRuleStore,
{
    store: Arc<R>,
}

impl<R> Clone for TransitionValidator<R>
where
    R: TransitionRuleStore,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R> TransitionValidator<R>
where
    R: TransitionRuleStore,
{
    /// Creates a validator over `store`.
    #[must_use]
    pub const fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    /// Loads the rule table for `task_type`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Store`] when rules cannot be read and
    /// [`TransitionError::InvalidRules`] when they reference statuses
    /// outside the type.
    pub async fn table_for(&self, task_type: TaskType) -> TransitionResult<TransitionTable> {
        let rules = self.store.rules_for(task_type).await?;
        Ok(TransitionTable::new(task_type, rules)?)
    }

    /// Validates a proposed status change for an actor holding `roles`.
    ///
    /// Returns the rule that opens the edge.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Denied`] when the edge does not exist or
    /// is closed to `roles`; this is final and should not be retried.
    pub async fn validate_transition(
        &self,
        task_type: TaskType,
        from: TaskStatus,
        to: TaskStatus,
        roles: &RoleSet,
    ) -> TransitionResult<TransitionRule> {
        let table = self.table_for(task_type).await?;
        let rule = table.validate(from, to, roles)?;
        Ok(rule.clone())
    }

    /// Lists statuses reachable from `from` for an actor holding `roles`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when the rule table cannot be loaded.
    pub async fn allowed_transitions(
        &self,
        task_type: TaskType,
        from: TaskStatus,
        roles: &RoleSet,
    ) -> TransitionResult<Vec<TaskStatus>> {
        let table = self.table_for(task_type).await?;
        Ok(table.allowed_targets(from, roles))
    }
}
