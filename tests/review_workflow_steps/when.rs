//! When steps for review workflow BDD scenarios.

use super::world::{ReviewWorkflowWorld, run_async};
use rstest_bdd_macros::when;
use stagegate::review::domain::Opinion;
use stagegate::task::domain::UserId;
use stagegate::workflow::services::{
    FinalizeReviewRequest, ReviewOpinionRequest, SubmitSolutionRequest,
};

fn submit(world: &mut ReviewWorkflowWorld, actor: UserId, content: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(world.service.submit_solution(SubmitSolutionRequest::new(
        task_id, actor, content,
    )));
    if let Some(submitted) = world.record(result) {
        world.previous_session = world.session.replace(submitted.session);
    }
    Ok(())
}

#[when(r#"the executor submits the solution "{content}""#)]
fn executor_submits(world: &mut ReviewWorkflowWorld, content: String) -> Result<(), eyre::Report> {
    let executor = world.executor;
    submit(world, executor, content)
}

#[when(r#"the creator submits the solution "{content}""#)]
fn creator_submits(world: &mut ReviewWorkflowWorld, content: String) -> Result<(), eyre::Report> {
    let creator = world.creator;
    submit(world, creator, content)
}

#[when("the creator invites {count:usize} jurors with a quorum of {quorum:u32}")]
fn creator_invites(
    world: &mut ReviewWorkflowWorld,
    count: usize,
    quorum: u32,
) -> Result<(), eyre::Report> {
    let session_id = world.session()?.id();
    world.jurors = (0..count).map(|_| UserId::new()).collect();
    let result = run_async(world.service.invite_jury_members(
        session_id,
        world.creator,
        world.jurors.clone(),
        quorum,
    ));
    if let Some(convened) = world.record(result) {
        world.session = Some(convened);
    }
    Ok(())
}

#[when(r#"juror {position:usize} votes "{opinion}""#)]
fn juror_votes(
    world: &mut ReviewWorkflowWorld,
    position: usize,
    opinion: String,
) -> Result<(), eyre::Report> {
    let vote = Opinion::try_from(opinion.as_str())
        .map_err(|err| eyre::eyre!("invalid opinion in scenario: {err}"))?;
    let juror = world.juror(position)?;
    let session_id = world.session()?.id();
    let result = run_async(
        world
            .service
            .submit_review_opinion(ReviewOpinionRequest::new(session_id, juror, vote)),
    );
    world.record(result);
    Ok(())
}

#[when("the creator removes juror {position:usize}")]
fn creator_removes(world: &mut ReviewWorkflowWorld, position: usize) -> Result<(), eyre::Report> {
    let juror = world.juror(position)?;
    let session_id = world.session()?.id();
    let result = run_async(
        world
            .service
            .remove_jury_member(session_id, world.creator, juror),
    );
    world.record(result);
    Ok(())
}

#[when("the creator re-invites juror {position:usize}")]
fn creator_reinvites(world: &mut ReviewWorkflowWorld, position: usize) -> Result<(), eyre::Report> {
    let juror = world.juror(position)?;
    let session = world.session()?;
    let (session_id, quorum) = (session.id(), session.required_approvals());
    let result = run_async(world.service.invite_jury_members(
        session_id,
        world.creator,
        [juror],
        quorum,
    ));
    if let Some(convened) = world.record(result) {
        world.session = Some(convened);
    }
    Ok(())
}

fn finalize(world: &mut ReviewWorkflowWorld, approved: bool) -> Result<(), eyre::Report> {
    let session_id = world.session()?.id();
    let result = run_async(world.service.finalize_review(FinalizeReviewRequest::new(
        session_id,
        world.creator,
        approved,
    )));
    if let Some(finalized) = world.record(result) {
        world.task = Some(finalized.task);
        world.session = Some(finalized.session);
    }
    Ok(())
}

#[when("the creator finalizes the review as approved")]
fn creator_approves(world: &mut ReviewWorkflowWorld) -> Result<(), eyre::Report> {
    finalize(world, true)
}

#[when("the creator finalizes the review as rejected")]
fn creator_rejects(world: &mut ReviewWorkflowWorld) -> Result<(), eyre::Report> {
    finalize(world, false)
}
