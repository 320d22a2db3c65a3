//! Given steps for review workflow BDD scenarios.

use super::world::{ReviewWorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use stagegate::task::domain::{TaskType, UserId};
use stagegate::workflow::services::{
    CreateTaskRequest, FinalizeReviewRequest, SubmitSolutionRequest,
};

#[given("a requirement created by the creator and assigned to the executor")]
fn assigned_requirement(world: &mut ReviewWorkflowWorld) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(TaskType::Requirement, "Import orders", world.creator)
        .with_executor(world.executor);
    let task = run_async(world.service.create_task(request))
        .wrap_err("create requirement for review scenario")?;
    world.task = Some(task);
    Ok(())
}

#[given("the executor has accepted the task")]
fn executor_accepted(world: &mut ReviewWorkflowWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let accepted = run_async(world.service.accept_task(task_id, world.executor))
        .wrap_err("accept task in scenario setup")?;
    world.task = Some(accepted);
    Ok(())
}

#[given(r#"the executor has submitted the solution "{content}""#)]
fn executor_submitted(world: &mut ReviewWorkflowWorld, content: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let submitted = run_async(world.service.submit_solution(SubmitSolutionRequest::new(
        task_id,
        world.executor,
        content,
    )))
    .wrap_err("submit solution in scenario setup")?;
    world.session = Some(submitted.session);
    Ok(())
}

#[given("the creator has rejected the review")]
fn creator_rejected(world: &mut ReviewWorkflowWorld) -> Result<(), eyre::Report> {
    let session_id = world.session()?.id();
    let finalized = run_async(world.service.finalize_review(FinalizeReviewRequest::new(
        session_id,
        world.creator,
        false,
    )))
    .wrap_err("reject review in scenario setup")?;
    world.task = Some(finalized.task);
    world.session = Some(finalized.session);
    Ok(())
}

#[given("the creator has invited {count:usize} jurors with a quorum of {quorum:u32}")]
fn creator_invited(
    world: &mut ReviewWorkflowWorld,
    count: usize,
    quorum: u32,
) -> Result<(), eyre::Report> {
    let session_id = world.session()?.id();
    world.jurors = (0..count).map(|_| UserId::new()).collect();
    let convened = run_async(world.service.invite_jury_members(
        session_id,
        world.creator,
        world.jurors.clone(),
        quorum,
    ))
    .wrap_err("invite jury in scenario setup")?;
    world.session = Some(convened);
    Ok(())
}
