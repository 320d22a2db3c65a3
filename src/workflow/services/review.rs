//! Review sessions: opening, voting, jury roster and the creator's decision.

use super::{
    FinalizeReviewRequest, FinalizedReview, InitiateReviewRequest, ReviewOpinionRequest,
    WorkflowService,
    support::{
        actor_roles, bounded_text, invite_participant, lock_session, lock_task, log_failure,
        require_creator, required_text, status_entry,
    },
};
use crate::artifact::domain::ArtifactStatus;
use crate::review::domain::{
    Opinion, ReviewDecision, ReviewMode, ReviewRecord, ReviewSession, ReviewSessionDraft,
    ReviewSessionId, ReviewTarget, ReviewerRole, VoteDraft,
};
use crate::task::domain::{
    ChangeType, ParticipantRole, Task, TaskChangeLog, TaskId, TaskRole, UserId,
};
use crate::transition::ports::TransitionRuleStore;
use crate::workflow::{
    error::{ValidationError, WorkflowError, WorkflowResult},
    ports::{WorkflowStore, WorkflowTransaction},
};
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::Arc;

impl<S, R, C> WorkflowService<S, R, C>
where
    S: WorkflowStore,
    R: TransitionRuleStore,
    C: Clock + Send + Sync + 'static,
{
    /// Opens a review session explicitly, for example a jury re-review
    /// after the automatic session was cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Unauthorized`] unless the actor is the
    /// creator, [`WorkflowError::UnexpectedStatus`] when the task is not in
    /// the review type's gate status, [`WorkflowError::TargetNotInTask`] or
    /// a not-found error for a foreign or missing target,
    /// [`WorkflowError::StaleTarget`] when the target is not the task's
    /// latest pending version, and [`WorkflowError::ReviewAlreadyOpen`] when
    /// the target is already under review.
    pub async fn initiate_review(
        &self,
        request: InitiateReviewRequest,
    ) -> WorkflowResult<ReviewSession> {
        let jury = self.checked_jury(&request.jury, request.mode == ReviewMode::Jury)?;
        let InitiateReviewRequest {
            task_id,
            actor,
            review_type,
            target,
            mode,
            required_approvals,
            ..
        } = request;
        let quorum = required_approvals.unwrap_or(self.config.default_required_approvals);

        let clock = Arc::clone(&self.clock);
        let session = self
            .run(move |tx| {
                let task = lock_task(tx, task_id)?;
                require_creator(&task, actor, "initiate a review")?;
                if task.status() != review_type.gate_status() {
                    return Err(WorkflowError::UnexpectedStatus {
                        task_id,
                        action: "initiate a review",
                        status: task.status(),
                    });
                }
                ensure_reviewable_target(tx, task_id, target)?;
                reject_creator_in_jury(&task, &jury)?;
                if let Some(open) = tx.open_session_for_target(task_id, target)? {
                    return Err(WorkflowError::ReviewAlreadyOpen {
                        target,
                        session_id: open.id(),
                    });
                }

                let session = ReviewSession::open(
                    ReviewSessionDraft {
                        task_id,
                        review_type,
                        target,
                        mode,
                        required_approvals: quorum,
                        initiated_by: actor,
                    },
                    &*clock,
                )?;
                tx.insert_session(&session)?;
                let invited = seat_jurors(tx, &task, &jury, actor, &*clock)?;

                let comment = if invited.is_empty() {
                    format!("{review_type} ({mode})")
                } else {
                    format!("{review_type} ({mode}), jury: {}", join_ids(&invited))
                };
                let entry =
                    TaskChangeLog::new(task_id, actor, ChangeType::ReviewInitiated, &*clock)
                        .with_field(
                            "review_session",
                            None,
                            Some(session.id().to_string().as_str()),
                        )
                        .with_comment(comment);
                tx.append_change_log(&entry)?;
                Ok(session)
            })
            .await
            .inspect_err(|err| log_failure("initiate_review", err))?;

        tracing::info!(
            task_id = %task_id,
            actor = %actor,
            session_id = %session.id(),
            review_type = %session.review_type(),
            mode = %session.mode(),
            "review initiated"
        );
        Ok(session)
    }

    /// Records one reviewer's vote.
    ///
    /// The vote never closes the session; only
    /// [`finalize_review`](Self::finalize_review) does. The task creator
    /// decides through finalisation and cannot vote.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Review`] when the session is closed or the
    /// score is out of range, [`WorkflowError::Unauthorized`] for the
    /// creator or, in jury mode, for anyone outside the jury, and
    /// [`WorkflowError::AlreadyVoted`] for a second vote.
    pub async fn submit_review_opinion(
        &self,
        request: ReviewOpinionRequest,
    ) -> WorkflowResult<ReviewRecord> {
        bounded_text(
            "comment",
            request.comment.as_deref(),
            self.config.max_text_length,
        )?;
        let ReviewOpinionRequest {
            session_id,
            actor,
            opinion,
            comment,
            score,
        } = request;

        let clock = Arc::clone(&self.clock);
        let record = self
            .run(move |tx| {
                let (session, task) = lock_session(tx, session_id)?;
                session.ensure_open()?;
                let roles = actor_roles(tx, &task, actor)?;
                if roles.contains(TaskRole::Creator) {
                    return Err(WorkflowError::Unauthorized {
                        actor,
                        action: "vote; the creator decides by finalising",
                        required: TaskRole::Jury,
                    });
                }
                if session.mode() == ReviewMode::Jury && !roles.contains(TaskRole::Jury) {
                    return Err(WorkflowError::Unauthorized {
                        actor,
                        action: "vote in a jury review",
                        required: TaskRole::Jury,
                    });
                }

                let record = ReviewRecord::cast(
                    VoteDraft {
                        session_id,
                        reviewer_id: actor,
                        reviewer_role: ReviewerRole::Jury,
                        opinion,
                        score,
                        comment,
                    },
                    &*clock,
                )?;
                tx.insert_review_record(&record)?;

                let mut entry =
                    TaskChangeLog::new(task.id(), actor, ChangeType::ReviewOpinion, &*clock)
                        .with_field("opinion", None, Some(opinion.as_str()));
                if let Some(text) = record.comment() {
                    entry = entry.with_comment(text);
                }
                tx.append_change_log(&entry)?;
                Ok(record)
            })
            .await
            .inspect_err(|err| log_failure("submit_review_opinion", err))?;

        tracing::info!(
            session_id = %session_id,
            reviewer = %actor,
            opinion = %record.opinion(),
            "review opinion recorded"
        );
        Ok(record)
    }

    /// Closes a session with the creator's binding decision.
    ///
    /// Jury votes are advisory: the decision is applied whatever the tally.
    /// A creator record mirroring the decision is appended, the reviewed
    /// artifact is marked approved or rejected, and the task moves to the
    /// review type's outcome status.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Unauthorized`] unless the actor is the
    /// creator, [`WorkflowError::Review`] when the session is already
    /// closed, [`WorkflowError::OtherReviewOpen`] while another session of
    /// the task is in review, and [`WorkflowError::UnexpectedStatus`] or
    /// [`WorkflowError::Transition`] when the task is no longer in the
    /// review gate.
    pub async fn finalize_review(
        &self,
        request: FinalizeReviewRequest,
    ) -> WorkflowResult<FinalizedReview> {
        bounded_text(
            "comment",
            request.comment.as_deref(),
            self.config.max_text_length,
        )?;
        let FinalizeReviewRequest {
            session_id,
            actor,
            approved,
            comment,
        } = request;

        let table = self.table_for_session(session_id).await?;
        let clock = Arc::clone(&self.clock);
        let finalized = self
            .run(move |tx| {
                let (mut session, mut task) = lock_session(tx, session_id)?;
                require_creator(&task, actor, "finalize a review")?;
                session.ensure_open()?;
                if let Some(open) = tx
                    .sessions(task.id())?
                    .into_iter()
                    .find(|other| other.id() != session_id && other.is_open())
                {
                    return Err(WorkflowError::OtherReviewOpen {
                        session_id,
                        open_session_id: open.id(),
                    });
                }

                let from = task.status();
                if from != session.review_type().gate_status() {
                    return Err(WorkflowError::UnexpectedStatus {
                        task_id: task.id(),
                        action: "finalize a review",
                        status: from,
                    });
                }
                let decision = ReviewDecision::from_approved(approved);
                let to = session.review_type().outcome(decision);
                let roles = actor_roles(tx, &task, actor)?;
                table.validate(from, to, &roles)?;

                session.finalize(decision, actor, comment.clone(), &*clock)?;
                tx.update_session(&session)?;
                tx.insert_review_record(&ReviewRecord::cast(
                    VoteDraft {
                        session_id,
                        reviewer_id: actor,
                        reviewer_role: ReviewerRole::Creator,
                        opinion: Opinion::from(decision),
                        score: None,
                        comment: comment.clone(),
                    },
                    &*clock,
                )?)?;
                settle_target(tx, session.target(), decision)?;

                task.move_to(to, &*clock)?;
                tx.update_task(&task)?;

                let mut entry =
                    TaskChangeLog::new(task.id(), actor, ChangeType::ReviewFinalized, &*clock)
                        .with_field(
                            "final_decision",
                            None,
                            Some(decision.as_str()),
                        );
                if let Some(text) = comment {
                    entry = entry.with_comment(text);
                }
                tx.append_change_log(&entry)?;
                tx.append_change_log(&status_entry(&task, actor, from, &*clock))?;
                Ok(FinalizedReview { session, task })
            })
            .await
            .inspect_err(|err| log_failure("finalize_review", err))?;

        tracing::info!(
            session_id = %session_id,
            task_id = %finalized.task.id(),
            actor = %actor,
            decision = %ReviewDecision::from_approved(approved),
            status = %finalized.task.status(),
            "review finalized"
        );
        Ok(finalized)
    }

    /// Switches a session to jury mode and invites members.
    ///
    /// Members who already hold an active jury seat on the task are
    /// skipped, so repeating an invitation is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Validation`] for an empty or oversized list
    /// or a list naming the creator, [`WorkflowError::Unauthorized`] unless
    /// the actor is the creator, and [`WorkflowError::Review`] when the
    /// session is closed or the quorum is zero.
    pub async fn invite_jury_members(
        &self,
        session_id: ReviewSessionId,
        actor: UserId,
        members: impl IntoIterator<Item = UserId>,
        required_approvals: u32,
    ) -> WorkflowResult<ReviewSession> {
        let requested: Vec<UserId> = members.into_iter().collect();
        let jury = self.checked_jury(&requested, true)?;

        let clock = Arc::clone(&self.clock);
        let (session, invited) = self
            .run(move |tx| {
                let (mut session, task) = lock_session(tx, session_id)?;
                require_creator(&task, actor, "invite jury members")?;
                reject_creator_in_jury(&task, &jury)?;
                session.convene_jury(required_approvals)?;
                tx.update_session(&session)?;
                let invited = seat_jurors(tx, &task, &jury, actor, &*clock)?;

                tx.append_change_log(
                    &TaskChangeLog::new(task.id(), actor, ChangeType::JuryInvited, &*clock)
                        .with_field("jury", None, Some(join_ids(&invited).as_str()))
                        .with_comment(format!(
                            "session {session_id} requires {required_approvals} approvals"
                        )),
                )?;
                Ok((session, invited))
            })
            .await
            .inspect_err(|err| log_failure("invite_jury_members", err))?;

        tracing::info!(
            session_id = %session_id,
            actor = %actor,
            invited = invited.len(),
            required_approvals,
            "jury members invited"
        );
        Ok(session)
    }

    /// Removes a jury member and purges their votes in the session.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Unauthorized`] unless the actor is the
    /// creator, [`WorkflowError::Review`] when the session is closed, and
    /// [`WorkflowError::JuryMemberNotFound`] when the user holds no jury
    /// seat on the task.
    pub async fn remove_jury_member(
        &self,
        session_id: ReviewSessionId,
        actor: UserId,
        member: UserId,
    ) -> WorkflowResult<()> {
        let clock = Arc::clone(&self.clock);
        let purged = self
            .run(move |tx| {
                let (session, task) = lock_session(tx, session_id)?;
                require_creator(&task, actor, "remove jury members")?;
                session.ensure_open()?;
                if !tx.delete_participant(task.id(), member, ParticipantRole::Jury)? {
                    return Err(WorkflowError::JuryMemberNotFound {
                        session_id,
                        user_id: member,
                    });
                }
                let purged = tx.delete_review_records(session_id, member)?;

                tx.append_change_log(
                    &TaskChangeLog::new(task.id(), actor, ChangeType::JuryRemoved, &*clock)
                        .with_field("jury", Some(member.to_string().as_str()), None)
                        .with_comment(format!("{purged} votes purged from session {session_id}")),
                )?;
                Ok(purged)
            })
            .await
            .inspect_err(|err| log_failure("remove_jury_member", err))?;

        tracing::info!(
            session_id = %session_id,
            actor = %actor,
            member = %member,
            purged,
            "jury member removed"
        );
        Ok(())
    }

    /// Closes a session in review without a decision.
    ///
    /// The task status is left unchanged, so a new session can be opened
    /// for the same target.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Validation`] for a blank reason,
    /// [`WorkflowError::Unauthorized`] unless the actor is the creator and
    /// [`WorkflowError::Review`] when the session is already closed.
    pub async fn cancel_review(
        &self,
        session_id: ReviewSessionId,
        actor: UserId,
        reason: impl Into<String>,
    ) -> WorkflowResult<ReviewSession> {
        let reason_text: String = reason.into();
        required_text("reason", &reason_text, self.config.max_text_length)?;

        let clock = Arc::clone(&self.clock);
        let session = self
            .run(move |tx| {
                let (mut session, task) = lock_session(tx, session_id)?;
                require_creator(&task, actor, "cancel a review")?;
                session.cancel(actor, Some(reason_text.clone()), &*clock)?;
                tx.update_session(&session)?;
                tx.append_change_log(
                    &TaskChangeLog::new(task.id(), actor, ChangeType::ReviewCancelled, &*clock)
                        .with_field(
                            "review_session",
                            Some(session_id.to_string().as_str()),
                            Some(session.status().as_str()),
                        )
                        .with_comment(reason_text),
                )?;
                Ok(session)
            })
            .await
            .inspect_err(|err| log_failure("cancel_review", err))?;

        tracing::info!(session_id = %session_id, actor = %actor, "review cancelled");
        Ok(session)
    }

    /// Deduplicates and bounds a jury list.
    fn checked_jury(&self, members: &[UserId], required: bool) -> WorkflowResult<Vec<UserId>> {
        let mut seen = BTreeSet::new();
        let jury: Vec<UserId> = members
            .iter()
            .copied()
            .filter(|member| seen.insert(*member))
            .collect();
        if required && jury.is_empty() {
            return Err(ValidationError::EmptyJury.into());
        }
        if jury.len() > self.config.max_jury_size {
            return Err(ValidationError::TooManyJurors {
                max: self.config.max_jury_size,
                actual: jury.len(),
            }
            .into());
        }
        Ok(jury)
    }
}

fn reject_creator_in_jury(task: &Task, jury: &[UserId]) -> WorkflowResult<()> {
    if jury.iter().any(|member| task.is_creator(*member)) {
        return Err(ValidationError::CreatorAsJuror.into());
    }
    Ok(())
}

/// Gives each member a pending jury seat; returns the members newly seated.
fn seat_jurors(
    tx: &mut dyn WorkflowTransaction,
    task: &Task,
    jury: &[UserId],
    invited_by: UserId,
    clock: &impl Clock,
) -> WorkflowResult<Vec<UserId>> {
    let mut seated = Vec::new();
    for member in jury {
        if invite_participant(
            tx,
            task.id(),
            *member,
            ParticipantRole::Jury,
            invited_by,
            clock,
        )? {
            seated.push(*member);
        }
    }
    Ok(seated)
}

/// Checks the target belongs to the task and is its latest version still
/// awaiting a decision.
fn ensure_reviewable_target(
    tx: &mut dyn WorkflowTransaction,
    task_id: TaskId,
    target: ReviewTarget,
) -> WorkflowResult<()> {
    let (owner, version, status) = match target {
        ReviewTarget::Solution(id) => {
            let solution = tx
                .find_solution(id)?
                .ok_or(WorkflowError::SolutionNotFound(id))?;
            (solution.task_id(), solution.version(), solution.status())
        }
        ReviewTarget::ExecutionPlan(id) => {
            let plan = tx.find_plan(id)?.ok_or(WorkflowError::PlanNotFound(id))?;
            (plan.task_id(), plan.version(), plan.status())
        }
    };
    if owner != task_id {
        return Err(WorkflowError::TargetNotInTask { task_id, target });
    }
    let latest = match target {
        ReviewTarget::Solution(_) => tx.latest_solution_version(task_id)?,
        ReviewTarget::ExecutionPlan(_) => tx.latest_plan_version(task_id)?,
    };
    if latest != Some(version) || status != ArtifactStatus::Pending {
        return Err(WorkflowError::StaleTarget { task_id, target });
    }
    Ok(())
}

fn settle_target(
    tx: &mut dyn WorkflowTransaction,
    target: ReviewTarget,
    decision: ReviewDecision,
) -> WorkflowResult<()> {
    let status = match decision {
        ReviewDecision::Approved => ArtifactStatus::Approved,
        ReviewDecision::Rejected => ArtifactStatus::Rejected,
    };
    match target {
        ReviewTarget::Solution(id) => tx.update_solution_status(id, status)?,
        ReviewTarget::ExecutionPlan(id) => tx.update_plan_status(id, status)?,
    }
    Ok(())
}

fn join_ids(ids: &[UserId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
