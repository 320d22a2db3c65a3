//! In-process rule store backed by a fixed rule list.

use async_trait::async_trait;
use std::sync::Arc;

use crate::task::domain::TaskType;
use crate::transition::{
    domain::{TransitionRule, default_rules},
    ports::{TransitionRuleStore, TransitionRuleStoreResult},
};

/// Rule store serving an immutable, shared rule list.
///
/// [`Default`] serves the built-in catalogue.
#[derive(Debug, Clone)]
pub struct StaticTransitionRuleStore {
    rules: Arc<[TransitionRule]>,
}

impl StaticTransitionRuleStore {
    /// Creates a store serving `rules`.
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = TransitionRule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Returns every rule held by the store.
    #[must_use]
    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }
}

impl Default for StaticTransitionRuleStore {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

#[async_trait]
impl TransitionRuleStore for StaticTransitionRuleStore {
    async fn rules_for(&self, task_type: TaskType) -> TransitionRuleStoreResult<Vec<TransitionRule>> {
        Ok(self
            .rules
            .iter()
            .filter(|rule| rule.task_type() == task_type)
            .cloned()
            .collect())
    }
}
