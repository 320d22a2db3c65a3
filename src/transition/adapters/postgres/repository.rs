//! `PostgreSQL` rule store implementation.

use super::{models::TransitionRuleRow, schema::task_status_transitions};
use crate::task::domain::{TaskRole, TaskStatus, TaskType};
use crate::transition::{
    domain::TransitionRule,
    ports::{TransitionRuleStore, TransitionRuleStoreError, TransitionRuleStoreResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// `PostgreSQL` connection pool type used by the rule store.
pub type RulePgPool = Pool<ConnectionManager<PgConnection>>;

/// Rule store reading `task_status_transitions`.
#[derive(Debug, Clone)]
pub struct PostgresTransitionRuleStore {
    pool: RulePgPool,
}

impl PostgresTransitionRuleStore {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: RulePgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransitionRuleStore for PostgresTransitionRuleStore {
    async fn rules_for(&self, task_type: TaskType) -> TransitionRuleStoreResult<Vec<TransitionRule>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TransitionRuleStoreError::persistence)?;
            let rows = task_status_transitions::table
                .filter(task_status_transitions::task_type_code.eq(task_type.as_str()))
                .order(task_status_transitions::id.asc())
                .select(TransitionRuleRow::as_select())
                .load::<TransitionRuleRow>(&mut connection)
                .map_err(TransitionRuleStoreError::persistence)?;
            rows.into_iter().map(row_to_rule).collect()
        })
        .await
        .map_err(TransitionRuleStoreError::persistence)?
    }
}

fn row_to_rule(row: TransitionRuleRow) -> TransitionRuleStoreResult<TransitionRule> {
    let malformed = |err: crate::task::domain::ParseCodeError| {
        TransitionRuleStoreError::MalformedRule(format!("row {}: {err}", row.id))
    };
    let task_type = TaskType::try_from(row.task_type_code.as_str()).map_err(malformed)?;
    let from = TaskStatus::try_from(row.from_status_code.as_str()).map_err(malformed)?;
    let to = TaskStatus::try_from(row.to_status_code.as_str()).map_err(malformed)?;

    let mut rule = TransitionRule::new(task_type, from, to).with_allowed(row.is_allowed);
    if let Some(role) = row.required_role.as_deref() {
        rule = rule.with_required_role(TaskRole::try_from(role).map_err(malformed)?);
    }
    if row.requires_approval {
        rule = rule.requiring_approval();
    }
    Ok(rule)
}
