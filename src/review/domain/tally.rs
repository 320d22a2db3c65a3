//! Advisory vote count for a review session.

use super::{Opinion, ReviewRecord, ReviewSession, ReviewerRole};
use serde::{Deserialize, Serialize};

/// Running count of reviewer votes in a session.
///
/// The tally never closes a session; finalisation is always the creator's
/// call. It is exposed so callers can display progress towards the quorum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTally {
    /// Votes in favour.
    pub approvals: u32,
    /// Votes against.
    pub rejections: u32,
    /// Abstentions.
    pub abstentions: u32,
    /// Quorum configured on the session.
    pub required_approvals: u32,
}

impl ReviewTally {
    /// Counts the reviewer votes of `session`.
    ///
    /// The creator's finalisation record is not a vote and is skipped, as
    /// are records belonging to other sessions.
    #[must_use]
    pub fn of(session: &ReviewSession, records: &[ReviewRecord]) -> Self {
        records
            .iter()
            .filter(|record| {
                record.session_id() == session.id()
                    && record.reviewer_role() == ReviewerRole::Jury
            })
            .fold(
                Self {
                    required_approvals: session.required_approvals(),
                    ..Self::default()
                },
                |mut tally, record| {
                    let counter = match record.opinion() {
                        Opinion::Approve => &mut tally.approvals,
                        Opinion::Reject => &mut tally.rejections,
                        Opinion::Abstain => &mut tally.abstentions,
                    };
                    *counter = counter.saturating_add(1);
                    tally
                },
            )
    }

    /// Total number of votes counted.
    #[must_use]
    pub const fn votes(&self) -> u32 {
        self.approvals
            .saturating_add(self.rejections)
            .saturating_add(self.abstentions)
    }

    /// Returns `true` once approvals meet the configured quorum.
    #[must_use]
    pub const fn quorum_reached(&self) -> bool {
        self.approvals >= self.required_approvals
    }
}
