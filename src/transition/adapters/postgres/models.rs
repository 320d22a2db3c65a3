//! Diesel row models for transition rules.

use super::schema::task_status_transitions;
use diesel::prelude::*;

/// Query result row for transition rules.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_status_transitions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransitionRuleRow {
    /// Surrogate key.
    pub id: i32,
    /// Task type code.
    pub task_type_code: String,
    /// Source status code.
    pub from_status_code: String,
    /// Target status code.
    pub to_status_code: String,
    /// Required role code, if any.
    pub required_role: Option<String>,
    /// Whether a review decision is required.
    pub requires_approval: bool,
    /// Whether the edge is enabled.
    pub is_allowed: bool,
}
