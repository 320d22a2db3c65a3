//! Artifact versioning for solutions and execution plans.
//!
//! Storage of artifacts goes through the workflow unit of work; this context
//! holds only the domain model.

pub mod domain;

#[cfg(test)]
mod tests;
