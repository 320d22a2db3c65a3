//! Task participant rows: executor assignment and jury membership.

use super::{ParseCodeError, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role recorded on a participant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    /// Assigned executor.
    Executor,
    /// Jury member in review sessions.
    Jury,
}

impl ParticipantRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Executor => "executor",
            Self::Jury => "jury",
        }
    }
}

impl TryFrom<&str> for ParticipantRole {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "executor" => Ok(Self::Executor),
            "jury" => Ok(Self::Jury),
            _ => Err(ParseCodeError::new("participant role", value)),
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response state of a participant invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    /// Invited, no answer yet.
    Pending,
    /// Invitation accepted.
    Accepted,
    /// Invitation turned down.
    Rejected,
}

impl ParticipantStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for ParticipantStatus {
    type Error = ParseCodeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseCodeError::new("participant status", value)),
        }
    }
}

impl fmt::Display for ParticipantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership of a user in a task under a given role.
///
/// At most one row exists per `(task, user, role)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskParticipant {
    task_id: TaskId,
    user_id: UserId,
    role: ParticipantRole,
    status: ParticipantStatus,
    invited_by: UserId,
    invited_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted participant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedParticipantData {
    /// Owning task.
    pub task_id: TaskId,
    /// Participating user.
    pub user_id: UserId,
    /// Participation role.
    pub role: ParticipantRole,
    /// Invitation response state.
    pub status: ParticipantStatus,
    /// User who created the row.
    pub invited_by: UserId,
    /// Invitation timestamp.
    pub invited_at: DateTime<Utc>,
}

impl TaskParticipant {
    /// Creates a pending invitation.
    #[must_use]
    pub fn invite(
        task_id: TaskId,
        user_id: UserId,
        role: ParticipantRole,
        invited_by: UserId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            task_id,
            user_id,
            role,
            status: ParticipantStatus::Pending,
            invited_by,
            invited_at: clock.utc(),
        }
    }

    /// Reconstructs a participant row from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedParticipantData) -> Self {
        Self {
            task_id: data.task_id,
            user_id: data.user_id,
            role: data.role,
            status: data.status,
            invited_by: data.invited_by,
            invited_at: data.invited_at,
        }
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the participating user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the participation role.
    #[must_use]
    pub const fn role(&self) -> ParticipantRole {
        self.role
    }

    /// Returns the invitation response state.
    #[must_use]
    pub const fn status(&self) -> ParticipantStatus {
        self.status
    }

    /// Returns the user who created the invitation.
    #[must_use]
    pub const fn invited_by(&self) -> UserId {
        self.invited_by
    }

    /// Returns the invitation timestamp.
    #[must_use]
    pub const fn invited_at(&self) -> DateTime<Utc> {
        self.invited_at
    }

    /// Returns `true` unless the invitation was rejected.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != ParticipantStatus::Rejected
    }

    /// Records the participant's answer.
    pub const fn respond(&mut self, status: ParticipantStatus) {
        self.status = status;
    }

    /// Re-issues the invitation as pending.
    pub fn reinvite(&mut self, invited_by: UserId, clock: &impl Clock) {
        self.status = ParticipantStatus::Pending;
        self.invited_by = invited_by;
        self.invited_at = clock.utc();
    }
}
