//! Port contracts for workflow storage.

pub mod store;

pub use store::{WorkflowStore, WorkflowStoreError, WorkflowStoreResult, WorkflowTransaction};
