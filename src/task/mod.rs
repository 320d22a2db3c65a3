//! Task aggregate, participants, roles, and audit entries.
//!
//! This context holds the shared vocabulary every other context builds on:
//! task types with their status sets, the rules for deriving an actor's
//! roles on a task, and the change-log entry appended by each mutation.
//!
//! - Domain types in [`domain`]

pub mod domain;

#[cfg(test)]
mod tests;
