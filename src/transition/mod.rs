//! Rule-driven task status transitions.
//!
//! Allowed edges live in a declarative rule table keyed by task type,
//! source and target status, and required role. Everything that moves a
//! task consults the same table instead of branching per task type.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Validation services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
