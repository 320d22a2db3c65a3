//! Error types for task domain validation and code parsing.

use super::{TaskId, TaskStatus, TaskType};
use thiserror::Error;

/// Errors returned while constructing or mutating task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The status is not part of the status set defined for the task type.
    #[error("status '{status}' is not defined for task type '{task_type}'")]
    StatusNotInType {
        /// Task type whose status set was consulted.
        task_type: TaskType,
        /// Offending status.
        status: TaskStatus,
    },

    /// The creator was named as the executor of their own task.
    #[error("creator of task {0} cannot also be its executor")]
    CreatorAsExecutor(TaskId),
}

/// Error returned while parsing a persisted code (status, type, role, ...).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseCodeError {
    kind: &'static str,
    value: String,
}

impl ParseCodeError {
    /// Creates a parse error for the given code family and raw value.
    #[must_use]
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Returns the code family that failed to parse.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the raw value that failed to parse.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
