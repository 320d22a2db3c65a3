//! Read-only port for transition rule reference data.

use crate::task::domain::TaskType;
use crate::transition::domain::TransitionRule;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for rule store operations.
pub type TransitionRuleStoreResult<T> = Result<T, TransitionRuleStoreError>;

/// Source of transition rules. Queried, never mutated by the engine.
#[async_trait]
pub trait TransitionRuleStore: Send + Sync {
    /// Returns every rule defined for `task_type`, enabled or not.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionRuleStoreError`] when the rules cannot be read or
    /// a stored row cannot be decoded.
    async fn rules_for(&self, task_type: TaskType) -> TransitionRuleStoreResult<Vec<TransitionRule>>;
}

/// Errors returned by rule store implementations.
#[derive(Debug, Clone, Error)]
pub enum TransitionRuleStoreError {
    /// A stored rule row could not be decoded.
    #[error("malformed transition rule row: {0}")]
    MalformedRule(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransitionRuleStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
