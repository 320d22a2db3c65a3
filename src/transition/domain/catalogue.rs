//! Default transition rules shipped with the engine.
//!
//! The same edges are seeded into `task_status_transitions` by the SQL
//! migration; keep the two in step.

use super::TransitionRule;
use crate::task::domain::{TaskRole, TaskStatus, TaskType};

use TaskStatus::{
    Cancelled, Declined, InProgress, PendingAccept, PendingPlan, PendingSolution, PendingStart,
    PlanRejected, PlanReview, SolutionRejected, SolutionReview, Unassigned,
};

/// `(from, to, role, requires_approval)` edges for requirements.
const REQUIREMENT_EDGES: &[(TaskStatus, TaskStatus, TaskRole, bool)] = &[
    (Unassigned, PendingAccept, TaskRole::Creator, false),
    (Declined, PendingAccept, TaskRole::Creator, false),
    (PendingAccept, PendingSolution, TaskRole::Executor, false),
    (PendingAccept, Declined, TaskRole::Executor, false),
    (PendingSolution, SolutionReview, TaskRole::Executor, false),
    (SolutionRejected, SolutionReview, TaskRole::Executor, false),
    (SolutionReview, PendingPlan, TaskRole::Creator, true),
    (SolutionReview, SolutionRejected, TaskRole::Creator, true),
    (PendingPlan, PlanReview, TaskRole::Executor, false),
    (PlanRejected, PlanReview, TaskRole::Executor, false),
    (PlanReview, PendingStart, TaskRole::Creator, true),
    (PlanReview, PlanRejected, TaskRole::Creator, true),
    (PendingStart, InProgress, TaskRole::Executor, false),
    (InProgress, TaskStatus::Completed, TaskRole::Executor, false),
];

/// `(from, to, role, requires_approval)` edges for unit tasks.
const UNIT_EDGES: &[(TaskStatus, TaskStatus, TaskRole, bool)] = &[
    (Unassigned, PendingAccept, TaskRole::Creator, false),
    (PendingAccept, PendingStart, TaskRole::Executor, false),
    (PendingAccept, Unassigned, TaskRole::Executor, false),
    (PendingStart, InProgress, TaskRole::Executor, false),
    (InProgress, TaskStatus::Completed, TaskRole::Executor, false),
];

/// Returns the default rule set for every task type.
///
/// Besides the listed edges, the creator may cancel a task from any
/// non-terminal status.
#[must_use]
pub fn default_rules() -> Vec<TransitionRule> {
    TaskType::ALL
        .into_iter()
        .flat_map(rules_for_type)
        .collect()
}

fn rules_for_type(task_type: TaskType) -> Vec<TransitionRule> {
    let edges = match task_type {
        TaskType::Requirement => REQUIREMENT_EDGES,
        TaskType::Unit => UNIT_EDGES,
    };

    let listed = edges.iter().map(|&(from, to, role, requires_approval)| {
        let rule = TransitionRule::new(task_type, from, to).with_required_role(role);
        if requires_approval {
            rule.requiring_approval()
        } else {
            rule
        }
    });

    let cancellations = task_type
        .statuses()
        .iter()
        .copied()
        .filter(|status| !status.is_terminal())
        .map(move |from| {
            TransitionRule::new(task_type, from, Cancelled).with_required_role(TaskRole::Creator)
        });

    listed.chain(cancellations).collect()
}
