//! Stagegate: task lifecycle and review workflow engine.
//!
//! Tasks move through a status lifecycle whose legal edges come from a
//! declarative rule table. Executors submit versioned solutions and
//! execution plans; each submission opens a review session in which an
//! optional jury votes and the task creator makes the binding decision.
//! Every mutation is atomic and leaves an entry in the task's audit log.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`task`]: Task aggregate, roles, participants and change log
//! - [`transition`]: Rule table and transition validation
//! - [`artifact`]: Versioned solutions and execution plans with goals
//! - [`review`]: Review sessions, votes and tallies
//! - [`workflow`]: The orchestrator tying the contexts together

pub mod artifact;
pub mod review;
pub mod task;
pub mod transition;
pub mod workflow;
