//! Review session aggregate.

use super::{
    ReviewDecision, ReviewDomainError, ReviewMode, ReviewSessionId, ReviewTarget, ReviewType,
    SessionStatus,
};
use crate::task::domain::{TaskId, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Fields supplied when opening a review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSessionDraft {
    /// Task under review.
    pub task_id: TaskId,
    /// Kind of review.
    pub review_type: ReviewType,
    /// Artifact version under review.
    pub target: ReviewTarget,
    /// Vote collection mode.
    pub mode: ReviewMode,
    /// Advisory approval quorum.
    pub required_approvals: u32,
    /// User opening the session.
    pub initiated_by: UserId,
}

/// One approval round over exactly one artifact version.
///
/// Sessions open directly in [`SessionStatus::InReview`] and are closed
/// exactly once, by [`ReviewSession::finalize`] or [`ReviewSession::cancel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSession {
    id: ReviewSessionId,
    task_id: TaskId,
    review_type: ReviewType,
    target: ReviewTarget,
    mode: ReviewMode,
    required_approvals: u32,
    status: SessionStatus,
    initiated_by: UserId,
    initiated_at: DateTime<Utc>,
    final_decision: Option<ReviewDecision>,
    decided_by: Option<UserId>,
    decided_at: Option<DateTime<Utc>>,
    decision_comment: Option<String>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSessionData {
    /// Session identifier.
    pub id: ReviewSessionId,
    /// Task under review.
    pub task_id: TaskId,
    /// Kind of review.
    pub review_type: ReviewType,
    /// Artifact version under review.
    pub target: ReviewTarget,
    /// Vote collection mode.
    pub mode: ReviewMode,
    /// Advisory approval quorum.
    pub required_approvals: u32,
    /// Lifecycle state.
    pub status: SessionStatus,
    /// User who opened the session.
    pub initiated_by: UserId,
    /// Opening timestamp.
    pub initiated_at: DateTime<Utc>,
    /// Binding decision, once finalised.
    pub final_decision: Option<ReviewDecision>,
    /// User who closed the session.
    pub decided_by: Option<UserId>,
    /// Closing decision timestamp.
    pub decided_at: Option<DateTime<Utc>>,
    /// Decision or cancellation comment.
    pub decision_comment: Option<String>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

impl ReviewSession {
    /// Opens a session in review.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::TargetMismatch`] when the target kind
    /// does not suit the review type and
    /// [`ReviewDomainError::InvalidRequiredApprovals`] for a zero quorum.
    pub fn open(draft: ReviewSessionDraft, clock: &impl Clock) -> Result<Self, ReviewDomainError> {
        if draft.target.kind() != draft.review_type.target_kind() {
            return Err(ReviewDomainError::TargetMismatch {
                review_type: draft.review_type,
                target_kind: draft.target.kind(),
            });
        }
        if draft.required_approvals == 0 {
            return Err(ReviewDomainError::InvalidRequiredApprovals(0));
        }
        Ok(Self {
            id: ReviewSessionId::new(),
            task_id: draft.task_id,
            review_type: draft.review_type,
            target: draft.target,
            mode: draft.mode,
            required_approvals: draft.required_approvals,
            status: SessionStatus::InReview,
            initiated_by: draft.initiated_by,
            initiated_at: clock.utc(),
            final_decision: None,
            decided_by: None,
            decided_at: None,
            decision_comment: None,
            completed_at: None,
        })
    }

    /// Reconstructs a session from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSessionData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            review_type: data.review_type,
            target: data.target,
            mode: data.mode,
            required_approvals: data.required_approvals,
            status: data.status,
            initiated_by: data.initiated_by,
            initiated_at: data.initiated_at,
            final_decision: data.final_decision,
            decided_by: data.decided_by,
            decided_at: data.decided_at,
            decision_comment: data.decision_comment,
            completed_at: data.completed_at,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> ReviewSessionId {
        self.id
    }

    /// Returns the task under review.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the review type.
    #[must_use]
    pub const fn review_type(&self) -> ReviewType {
        self.review_type
    }

    /// Returns the artifact version under review.
    #[must_use]
    pub const fn target(&self) -> ReviewTarget {
        self.target
    }

    /// Returns the vote collection mode.
    #[must_use]
    pub const fn mode(&self) -> ReviewMode {
        self.mode
    }

    /// Returns the advisory approval quorum.
    #[must_use]
    pub const fn required_approvals(&self) -> u32 {
        self.required_approvals
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the user who opened the session.
    #[must_use]
    pub const fn initiated_by(&self) -> UserId {
        self.initiated_by
    }

    /// Returns the opening timestamp.
    #[must_use]
    pub const fn initiated_at(&self) -> DateTime<Utc> {
        self.initiated_at
    }

    /// Returns the binding decision, once finalised.
    #[must_use]
    pub const fn final_decision(&self) -> Option<ReviewDecision> {
        self.final_decision
    }

    /// Returns the user who closed the session.
    #[must_use]
    pub const fn decided_by(&self) -> Option<UserId> {
        self.decided_by
    }

    /// Returns the closing decision timestamp.
    #[must_use]
    pub const fn decided_at(&self) -> Option<DateTime<Utc>> {
        self.decided_at
    }

    /// Returns the decision or cancellation comment.
    #[must_use]
    pub fn decision_comment(&self) -> Option<&str> {
        self.decision_comment.as_deref()
    }

    /// Returns the completion timestamp.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns `true` while the session accepts votes and roster changes.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::InReview
    }

    /// Task status the decision leads to, once finalised.
    #[must_use]
    pub fn outcome_status(&self) -> Option<TaskStatus> {
        self.final_decision
            .map(|decision| self.review_type.outcome(decision))
    }

    /// Fails unless the session is in review.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::SessionNotOpen`] otherwise.
    pub fn ensure_open(&self) -> Result<(), ReviewDomainError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(ReviewDomainError::SessionNotOpen {
                session_id: self.id,
                status: self.status,
            })
        }
    }

    /// Switches the session to jury mode with a new quorum.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::SessionNotOpen`] for a closed session and
    /// [`ReviewDomainError::InvalidRequiredApprovals`] for a zero quorum.
    pub fn convene_jury(&mut self, required_approvals: u32) -> Result<(), ReviewDomainError> {
        self.ensure_open()?;
        if required_approvals == 0 {
            return Err(ReviewDomainError::InvalidRequiredApprovals(0));
        }
        self.mode = ReviewMode::Jury;
        self.required_approvals = required_approvals;
        Ok(())
    }

    /// Closes the session with the creator's binding decision.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::SessionNotOpen`] when the session was
    /// already closed; the session is left unchanged.
    pub fn finalize(
        &mut self,
        decision: ReviewDecision,
        decided_by: UserId,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), ReviewDomainError> {
        self.ensure_open()?;
        let now = clock.utc();
        self.status = SessionStatus::Completed;
        self.final_decision = Some(decision);
        self.decided_by = Some(decided_by);
        self.decided_at = Some(now);
        self.decision_comment = comment;
        self.completed_at = Some(now);
        Ok(())
    }

    /// Closes the session without a decision.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::SessionNotOpen`] when the session was
    /// already closed.
    pub fn cancel(
        &mut self,
        cancelled_by: UserId,
        reason: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), ReviewDomainError> {
        self.ensure_open()?;
        let now = clock.utc();
        self.status = SessionStatus::Cancelled;
        self.decided_by = Some(cancelled_by);
        self.decided_at = Some(now);
        self.decision_comment = reason;
        self.completed_at = Some(now);
        Ok(())
    }
}
