//! `PostgreSQL` adapter for transition rule reference data.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresTransitionRuleStore, RulePgPool};
