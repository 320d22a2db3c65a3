//! Error types for review session and vote validation.

use super::{ReviewSessionId, ReviewType, SessionStatus, TargetKind};
use thiserror::Error;

/// Errors returned while building or mutating review values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewDomainError {
    /// The session is no longer accepting changes.
    #[error("review session {session_id} is {status}, not in review")]
    SessionNotOpen {
        /// Session that was addressed.
        session_id: ReviewSessionId,
        /// Its current status.
        status: SessionStatus,
    },

    /// Required approvals must be at least one.
    #[error("required approvals must be at least 1, got {0}")]
    InvalidRequiredApprovals(u32),

    /// Scores range from 0 to 100.
    #[error("review score {0} is outside 0..=100")]
    ScoreOutOfRange(u8),

    /// The review type does not apply to the target artifact kind.
    #[error("review type '{review_type}' cannot target a {target_kind}")]
    TargetMismatch {
        /// Requested review type.
        review_type: ReviewType,
        /// Kind of the supplied target.
        target_kind: TargetKind,
    },
}
