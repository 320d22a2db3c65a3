//! Shared world state for review workflow BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use stagegate::review::domain::ReviewSession;
use stagegate::task::domain::{Task, UserId};
use stagegate::transition::adapters::memory::StaticTransitionRuleStore;
use stagegate::workflow::{WorkflowError, WorkflowService, adapters::memory::InMemoryWorkflowStore};

/// Service type used by the BDD world.
pub type TestWorkflowService =
    WorkflowService<InMemoryWorkflowStore, StaticTransitionRuleStore, DefaultClock>;

/// Scenario world for review workflow behaviour tests.
pub struct ReviewWorkflowWorld {
    pub service: TestWorkflowService,
    pub creator: UserId,
    pub executor: UserId,
    pub jurors: Vec<UserId>,
    pub task: Option<Task>,
    pub session: Option<ReviewSession>,
    pub previous_session: Option<ReviewSession>,
    pub last_error: Option<WorkflowError>,
}

impl ReviewWorkflowWorld {
    /// Creates a world with a fresh store and cast.
    #[must_use]
    pub fn new() -> Self {
        let service = WorkflowService::new(
            Arc::new(InMemoryWorkflowStore::new()),
            Arc::new(StaticTransitionRuleStore::default()),
            Arc::new(DefaultClock),
        );

        Self {
            service,
            creator: UserId::new(),
            executor: UserId::new(),
            jurors: Vec::new(),
            task: None,
            session: None,
            previous_session: None,
            last_error: None,
        }
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error when no task was created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Returns the current review session.
    ///
    /// # Errors
    ///
    /// Returns an error when no session was opened yet.
    pub fn session(&self) -> Result<&ReviewSession, eyre::Report> {
        self.session
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing review session in scenario world"))
    }

    /// Returns the juror at 1-based `position`.
    ///
    /// # Errors
    ///
    /// Returns an error when fewer jurors were invited.
    pub fn juror(&self, position: usize) -> Result<UserId, eyre::Report> {
        position
            .checked_sub(1)
            .and_then(|index| self.jurors.get(index))
            .copied()
            .ok_or_else(|| eyre::eyre!("no juror at position {position}"))
    }

    /// Records the outcome of an operation whose failure a scenario may
    /// assert on.
    pub fn record<T>(&mut self, result: Result<T, WorkflowError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(err) => {
                self.last_error = Some(err);
                None
            }
        }
    }
}

impl Default for ReviewWorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ReviewWorkflowWorld {
    ReviewWorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
