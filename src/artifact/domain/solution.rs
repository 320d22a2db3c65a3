//! Solution artifact versions.

use super::{ArtifactDomainError, ArtifactStatus, ArtifactVersion, SolutionId};
use crate::task::domain::{TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// One submitted version of a task's solution.
///
/// Rows are never edited after submission apart from the review outcome;
/// a resubmission creates a new version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    id: SolutionId,
    task_id: TaskId,
    version: ArtifactVersion,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mindmap_ref: Option<String>,
    status: ArtifactStatus,
    submitted_by: UserId,
    submitted_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSolutionData {
    /// Solution identifier.
    pub id: SolutionId,
    /// Owning task.
    pub task_id: TaskId,
    /// Per-task version.
    pub version: ArtifactVersion,
    /// Solution body.
    pub content: String,
    /// Opaque reference to an attached mind map.
    pub mindmap_ref: Option<String>,
    /// Review outcome.
    pub status: ArtifactStatus,
    /// Submitting user.
    pub submitted_by: UserId,
    /// Submission timestamp.
    pub submitted_at: DateTime<Utc>,
}

impl Solution {
    /// Creates a pending solution version.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactDomainError::EmptyContent`] for blank content.
    pub fn submit(
        task_id: TaskId,
        version: ArtifactVersion,
        content: impl Into<String>,
        submitted_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, ArtifactDomainError> {
        let body: String = content.into();
        if body.trim().is_empty() {
            return Err(ArtifactDomainError::EmptyContent);
        }
        Ok(Self {
            id: SolutionId::new(),
            task_id,
            version,
            content: body,
            mindmap_ref: None,
            status: ArtifactStatus::Pending,
            submitted_by,
            submitted_at: clock.utc(),
        })
    }

    /// Attaches a mind-map reference.
    #[must_use]
    pub fn with_mindmap_ref(mut self, mindmap_ref: Option<String>) -> Self {
        self.mindmap_ref = mindmap_ref;
        self
    }

    /// Reconstructs a solution from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSolutionData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            version: data.version,
            content: data.content,
            mindmap_ref: data.mindmap_ref,
            status: data.status,
            submitted_by: data.submitted_by,
            submitted_at: data.submitted_at,
        }
    }

    /// Returns the solution identifier.
    #[must_use]
    pub const fn id(&self) -> SolutionId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the per-task version.
    #[must_use]
    pub const fn version(&self) -> ArtifactVersion {
        self.version
    }

    /// Returns the solution body.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the mind-map reference.
    #[must_use]
    pub fn mindmap_ref(&self) -> Option<&str> {
        self.mindmap_ref.as_deref()
    }

    /// Returns the review outcome.
    #[must_use]
    pub const fn status(&self) -> ArtifactStatus {
        self.status
    }

    /// Returns the submitting user.
    #[must_use]
    pub const fn submitted_by(&self) -> UserId {
        self.submitted_by
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Records the review outcome.
    pub const fn settle(&mut self, status: ArtifactStatus) {
        self.status = status;
    }
}
