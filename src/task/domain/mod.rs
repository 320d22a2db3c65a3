//! Domain model for tasks and the people around them.
//!
//! Covers the task aggregate with its per-type status sets, participant rows
//! (executor assignment and jury membership), role derivation, and the
//! append-only change log. Nothing here touches storage.

mod change_log;
mod error;
mod ids;
mod participant;
mod role;
mod status;
mod task;

pub use change_log::{ChangeType, PersistedChangeLogData, TaskChangeLog};
pub use error::{ParseCodeError, TaskDomainError};
pub use ids::{ChangeLogId, TaskId, UserId};
pub use participant::{
    ParticipantRole, ParticipantStatus, PersistedParticipantData, TaskParticipant,
};
pub use role::{RoleSet, TaskRole, derive_roles};
pub use status::{Priority, TaskStatus, TaskType};
pub use task::{PersistedTaskData, Task, TaskDraft};
