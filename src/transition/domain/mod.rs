//! Domain model for rule-driven status transitions.
//!
//! Rules are reference data keyed by `(task_type, from, to, role)`. A
//! [`TransitionTable`] holds the rules of one task type and answers
//! "may this actor take this edge?" without touching storage.

mod catalogue;
mod error;
mod rule;
mod table;

pub use catalogue::default_rules;
pub use error::{TransitionDenied, TransitionDomainError};
pub use rule::TransitionRule;
pub use table::TransitionTable;
