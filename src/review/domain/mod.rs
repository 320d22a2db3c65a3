//! Review sessions and jury votes over submitted artifacts.
//!
//! A session reviews exactly one artifact version. Jury members may vote
//! while it is in review, but only the task creator's finalisation decides
//! the outcome; the vote tally is advisory.

mod codes;
mod error;
mod ids;
mod record;
mod session;
mod tally;

pub use codes::{
    Opinion, ReviewDecision, ReviewMode, ReviewTarget, ReviewType, ReviewerRole, SessionStatus,
    TargetKind,
};
pub use error::ReviewDomainError;
pub use ids::{ReviewRecordId, ReviewSessionId};
pub use record::{MAX_SCORE, PersistedRecordData, ReviewRecord, VoteDraft, VoteWeight};
pub use session::{PersistedSessionData, ReviewSession, ReviewSessionDraft};
pub use tally::ReviewTally;
