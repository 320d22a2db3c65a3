//! Limits and defaults applied by the workflow service.

use serde::{Deserialize, Serialize};

/// Configuration for [`WorkflowService`](super::services::WorkflowService).
///
/// # Examples
///
/// ```
/// use stagegate::workflow::WorkflowConfig;
///
/// let config = WorkflowConfig::default();
/// assert_eq!(config.default_required_approvals, 1);
///
/// let strict = WorkflowConfig::strict();
/// assert!(strict.max_goals_per_plan < config.max_goals_per_plan);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Maximum number of goals in one execution plan.
    pub max_goals_per_plan: usize,
    /// Maximum number of jury members invited in one call.
    pub max_jury_size: usize,
    /// Maximum length in characters of content, comment and reason fields.
    pub max_text_length: usize,
    /// Required approvals for sessions opened by a submission.
    pub default_required_approvals: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_goals_per_plan: 100,
            max_jury_size: 25,
            max_text_length: 100_000,
            default_required_approvals: 1,
        }
    }
}

impl WorkflowConfig {
    /// Creates a configuration with generous limits.
    ///
    /// Useful for bulk imports and tests.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            max_goals_per_plan: 1_000,
            max_jury_size: 100,
            max_text_length: 1_000_000,
            ..Default::default()
        }
    }

    /// Creates a configuration with reduced limits.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_goals_per_plan: 20,
            max_jury_size: 7,
            max_text_length: 10_000,
            default_required_approvals: 1,
        }
    }
}
