//! Individual votes cast in a review session.

use super::{Opinion, ReviewDomainError, ReviewRecordId, ReviewSessionId, ReviewerRole};
use crate::task::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Highest accepted review score.
pub const MAX_SCORE: u8 = 100;

/// Relative weight of a vote. Every vote currently carries 1.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteWeight(f64);

impl VoteWeight {
    /// Weight given to every cast vote.
    pub const STANDARD: Self = Self(1.0);

    /// Wraps a stored weight.
    #[must_use]
    pub const fn from_stored(value: f64) -> Self {
        Self(value)
    }

    /// Returns the raw weight.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for VoteWeight {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Vote fields supplied by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteDraft {
    /// Session voted in.
    pub session_id: ReviewSessionId,
    /// Voting user.
    pub reviewer_id: UserId,
    /// Capacity of the vote.
    pub reviewer_role: ReviewerRole,
    /// The vote itself.
    pub opinion: Opinion,
    /// Optional score out of [`MAX_SCORE`].
    pub score: Option<u8>,
    /// Free-text remark.
    pub comment: Option<String>,
}

/// One reviewer's vote. At most one exists per `(session, reviewer)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    id: ReviewRecordId,
    session_id: ReviewSessionId,
    reviewer_id: UserId,
    reviewer_role: ReviewerRole,
    opinion: Opinion,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<u8>,
    weight: VoteWeight,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted review record.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRecordData {
    /// Record identifier.
    pub id: ReviewRecordId,
    /// Session voted in.
    pub session_id: ReviewSessionId,
    /// Voting user.
    pub reviewer_id: UserId,
    /// Capacity of the vote.
    pub reviewer_role: ReviewerRole,
    /// The vote.
    pub opinion: Opinion,
    /// Optional score.
    pub score: Option<u8>,
    /// Vote weight.
    pub weight: VoteWeight,
    /// Free-text remark.
    pub comment: Option<String>,
    /// Vote timestamp.
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    /// Records a vote with the standard weight.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewDomainError::ScoreOutOfRange`] for a score above
    /// [`MAX_SCORE`].
    pub fn cast(draft: VoteDraft, clock: &impl Clock) -> Result<Self, ReviewDomainError> {
        if let Some(score) = draft.score
            && score > MAX_SCORE
        {
            return Err(ReviewDomainError::ScoreOutOfRange(score));
        }
        Ok(Self {
            id: ReviewRecordId::new(),
            session_id: draft.session_id,
            reviewer_id: draft.reviewer_id,
            reviewer_role: draft.reviewer_role,
            opinion: draft.opinion,
            score: draft.score,
            weight: VoteWeight::STANDARD,
            comment: draft.comment,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedRecordData) -> Self {
        Self {
            id: data.id,
            session_id: data.session_id,
            reviewer_id: data.reviewer_id,
            reviewer_role: data.reviewer_role,
            opinion: data.opinion,
            score: data.score,
            weight: data.weight,
            comment: data.comment,
            created_at: data.created_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> ReviewRecordId {
        self.id
    }

    /// Returns the session voted in.
    #[must_use]
    pub const fn session_id(&self) -> ReviewSessionId {
        self.session_id
    }

    /// Returns the voting user.
    #[must_use]
    pub const fn reviewer_id(&self) -> UserId {
        self.reviewer_id
    }

    /// Returns the capacity of the vote.
    #[must_use]
    pub const fn reviewer_role(&self) -> ReviewerRole {
        self.reviewer_role
    }

    /// Returns the vote.
    #[must_use]
    pub const fn opinion(&self) -> Opinion {
        self.opinion
    }

    /// Returns the score.
    #[must_use]
    pub const fn score(&self) -> Option<u8> {
        self.score
    }

    /// Returns the vote weight.
    #[must_use]
    pub const fn weight(&self) -> VoteWeight {
        self.weight
    }

    /// Returns the remark.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the vote timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
