//! Then steps for review workflow BDD scenarios.

use super::world::{ReviewWorkflowWorld, run_async};
use rstest_bdd_macros::then;
use stagegate::review::domain::{ReviewDecision, ReviewMode, SessionStatus};
use stagegate::task::domain::{ParticipantRole, ParticipantStatus, TaskStatus};

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &ReviewWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = run_async(world.service.task(world.task()?.id()))?;
    eyre::ensure!(
        task.status() == expected,
        "expected status {expected}, found {}",
        task.status()
    );
    Ok(())
}

#[then("solution version {version:u32} exists")]
fn solution_version_exists(world: &ReviewWorkflowWorld, version: u32) -> Result<(), eyre::Report> {
    let solutions = run_async(world.service.solutions(world.task()?.id()))?;
    let versions: Vec<u32> = solutions.iter().map(|s| s.version().value()).collect();
    eyre::ensure!(
        versions == (1..=version).collect::<Vec<_>>(),
        "expected versions 1..={version}, found {versions:?}"
    );
    Ok(())
}

#[then("a single review session is open requiring {quorum:u32} approval")]
fn single_session_open(world: &ReviewWorkflowWorld, quorum: u32) -> Result<(), eyre::Report> {
    let session = world.session()?;
    eyre::ensure!(session.mode() == ReviewMode::Single, "session is not single mode");
    eyre::ensure!(
        session.status() == SessionStatus::InReview,
        "session is {}",
        session.status()
    );
    eyre::ensure!(
        session.required_approvals() == quorum,
        "expected quorum {quorum}, found {}",
        session.required_approvals()
    );
    Ok(())
}

#[then(r#"the review session is completed with decision "{decision}""#)]
fn session_completed(world: &ReviewWorkflowWorld, decision: String) -> Result<(), eyre::Report> {
    let expected = ReviewDecision::try_from(decision.as_str())
        .map_err(|err| eyre::eyre!("invalid expected decision in scenario: {err}"))?;
    let session = run_async(world.service.review_session(world.session()?.id()))?;
    eyre::ensure!(
        session.status() == SessionStatus::Completed,
        "session is {}",
        session.status()
    );
    eyre::ensure!(
        session.final_decision() == Some(expected),
        "expected decision {expected}, found {:?}",
        session.final_decision()
    );
    Ok(())
}

#[then("the review session is in jury mode")]
fn session_in_jury_mode(world: &ReviewWorkflowWorld) -> Result<(), eyre::Report> {
    let session = run_async(world.service.review_session(world.session()?.id()))?;
    eyre::ensure!(session.mode() == ReviewMode::Jury, "session is {}", session.mode());
    Ok(())
}

#[then("{count:usize} jury members are pending")]
fn jury_members_pending(world: &ReviewWorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    let participants = run_async(world.service.participants(world.task()?.id()))?;
    let pending = participants
        .iter()
        .filter(|row| row.role() == ParticipantRole::Jury && row.status() == ParticipantStatus::Pending)
        .count();
    eyre::ensure!(pending == count, "expected {count} pending jurors, found {pending}");
    Ok(())
}

#[then("the review session vote count is {count:u32}")]
fn session_vote_count(world: &ReviewWorkflowWorld, count: u32) -> Result<(), eyre::Report> {
    let tally = run_async(world.service.review_tally(world.session()?.id()))?;
    eyre::ensure!(
        tally.votes() == count,
        "expected {count} votes, found {}",
        tally.votes()
    );
    Ok(())
}

#[then("the previous review session remains completed")]
fn previous_session_completed(world: &ReviewWorkflowWorld) -> Result<(), eyre::Report> {
    let previous = world
        .previous_session
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing previous session in scenario world"))?;
    let session = run_async(world.service.review_session(previous.id()))?;
    eyre::ensure!(
        session.status() == SessionStatus::Completed,
        "previous session is {}",
        session.status()
    );
    eyre::ensure!(
        session.id() != world.session()?.id(),
        "resubmission reused the previous session"
    );
    Ok(())
}

#[then(r#"the last operation fails with a "{kind}" error"#)]
fn last_operation_fails(world: &ReviewWorkflowWorld, kind: String) -> Result<(), eyre::Report> {
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the last operation to fail"))?;
    eyre::ensure!(
        err.kind().as_str() == kind,
        "expected a {kind} error, got {} ({err})",
        err.kind()
    );
    Ok(())
}
