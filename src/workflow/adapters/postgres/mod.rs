//! `PostgreSQL` adapter for workflow storage.
//!
//! Tables are created by the migrations under `migrations/`.

mod conversion;
mod models;
mod schema;
mod store;

pub use conversion::MalformedRow;
pub use store::{PostgresWorkflowStore, WorkflowPgPool};
