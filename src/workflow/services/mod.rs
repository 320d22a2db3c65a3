//! Workflow orchestrator: the actor operations of the engine.
//!
//! Every mutating operation follows the same shape. Input is validated
//! first, the task's rule table is loaded, then one store transaction locks
//! the task, re-derives the actor's roles, checks state and authorisation,
//! writes, and appends change-log entries. Any error rolls the whole
//! transaction back.

mod queries;
mod requests;
mod review;
mod submission;
mod support;
mod task_ops;

pub use requests::{
    CreateTaskRequest, FinalizeReviewRequest, FinalizedReview, InitiateReviewRequest,
    ReviewOpinionRequest, SubmitExecutionPlanRequest, SubmitSolutionRequest, SubmittedPlan,
    SubmittedSolution,
};

use crate::review::domain::ReviewSessionId;
use crate::task::domain::TaskId;
use crate::transition::{
    domain::TransitionTable, ports::TransitionRuleStore, services::TransitionValidator,
};
use crate::workflow::{
    WorkflowConfig,
    error::{WorkflowError, WorkflowResult},
    ports::{WorkflowStore, WorkflowTransaction},
};
use mockable::Clock;
use std::sync::Arc;

/// Workflow orchestration service.
pub struct WorkflowService<S, R, C>
where
    S: WorkflowStore,
    R: TransitionRuleStore,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    validator: TransitionValidator<R>,
    clock: Arc<C>,
    config: WorkflowConfig,
}

impl<S, R, C> Clone for WorkflowService<S, R, C>
where
    S: WorkflowStore,
    R: TransitionRuleStore,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            validator: self.validator.clone(),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<S, R, C> WorkflowService<S, R, C>
where
    S: WorkflowStore,
    R: TransitionRuleStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a service with the default configuration.
    #[must_use]
    pub fn new(store: Arc<S>, rules: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            store,
            validator: TransitionValidator::new(rules),
            clock,
            config: WorkflowConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Returns the transition validator used by the service.
    #[must_use]
    pub const fn validator(&self) -> &TransitionValidator<R> {
        &self.validator
    }

    async fn run<T, F>(&self, operation: F) -> WorkflowResult<T>
    where
        F: FnOnce(&mut dyn WorkflowTransaction) -> WorkflowResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.store.transaction(operation).await
    }

    /// Loads the rule table for the task's type.
    ///
    /// The task type never changes, so reading it outside the operation's
    /// transaction is safe.
    async fn table_for_task(&self, task_id: TaskId) -> WorkflowResult<TransitionTable> {
        let task_type = self
            .run(move |tx| {
                tx.find_task(task_id)?
                    .map(|task| task.task_type())
                    .ok_or(WorkflowError::TaskNotFound(task_id))
            })
            .await?;
        Ok(self.validator.table_for(task_type).await?)
    }

    /// Loads the rule table for the task a session belongs to.
    async fn table_for_session(
        &self,
        session_id: ReviewSessionId,
    ) -> WorkflowResult<TransitionTable> {
        let task_id = self
            .run(move |tx| {
                tx.find_session(session_id)?
                    .map(|session| session.task_id())
                    .ok_or(WorkflowError::SessionNotFound(session_id))
            })
            .await?;
        self.table_for_task(task_id).await
    }
}
