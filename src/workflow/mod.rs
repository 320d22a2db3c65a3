//! Workflow orchestration: the operations actors invoke on tasks.
//!
//! Each operation composes the task, transition, artifact and review
//! contexts inside one store transaction, so a task's status, its artifacts,
//! its review state and its audit trail always change together.
//!
//! - Storage port in [`ports`]
//! - Store implementations in [`adapters`]
//! - The orchestrator in [`services`]
//! - Error taxonomy in [`error`]

pub mod adapters;
mod config;
pub mod error;
pub mod ports;
pub mod services;

pub use config::WorkflowConfig;
pub use error::{ValidationError, WorkflowError, WorkflowErrorKind, WorkflowResult};
pub use services::WorkflowService;

#[cfg(test)]
mod tests;
