//! Per-task artifact version numbers.

use super::ArtifactDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive, per-task artifact version.
///
/// Versions are allocated as `latest + 1` inside the submitting transaction
/// and are never reused, even after a rejection.
///
/// # Examples
///
/// ```
/// use stagegate::artifact::domain::ArtifactVersion;
///
/// let first = ArtifactVersion::next_after(None).expect("first version");
/// assert_eq!(first, ArtifactVersion::FIRST);
/// let second = ArtifactVersion::next_after(Some(first)).expect("second version");
/// assert_eq!(second.value(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ArtifactVersion(u32);

impl ArtifactVersion {
    /// Version given to the first submission of an artifact kind.
    pub const FIRST: Self = Self(1);

    /// Wraps a raw version number.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactDomainError::InvalidVersion`] for zero.
    pub fn new(value: u32) -> Result<Self, ArtifactDomainError> {
        if value == 0 {
            return Err(ArtifactDomainError::InvalidVersion(0));
        }
        Ok(Self(value))
    }

    /// Wraps a version read from a signed storage column.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactDomainError::InvalidVersion`] when `value` is not a
    /// positive `u32`.
    pub fn from_stored(value: i32) -> Result<Self, ArtifactDomainError> {
        u32::try_from(value)
            .map_err(|_| ArtifactDomainError::InvalidVersion(i64::from(value)))
            .and_then(Self::new)
    }

    /// Returns the version that follows `latest`, or [`Self::FIRST`] when
    /// nothing has been submitted yet.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactDomainError::InvalidVersion`] when the sequence is
    /// exhausted.
    pub fn next_after(latest: Option<Self>) -> Result<Self, ArtifactDomainError> {
        match latest {
            None => Ok(Self::FIRST),
            Some(Self(value)) => value
                .checked_add(1)
                .map(Self)
                .ok_or(ArtifactDomainError::InvalidVersion(i64::from(value))),
        }
    }

    /// Returns the raw version number.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for ArtifactVersion {
    type Error = ArtifactDomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ArtifactVersion> for u32 {
    fn from(version: ArtifactVersion) -> Self {
        version.0
    }
}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
