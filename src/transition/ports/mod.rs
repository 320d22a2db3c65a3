//! Port contracts for transition rule storage.

pub mod rule_store;

pub use rule_store::{TransitionRuleStore, TransitionRuleStoreError, TransitionRuleStoreResult};
