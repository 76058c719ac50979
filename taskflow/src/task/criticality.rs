//! Criticality labels for scheduling and backlog accounting.

use serde::{Deserialize, Serialize};

/// Ordinal priority label for a task.
///
/// Lower rank means higher priority: a `Blocker` is always scheduled before
/// a `Deferred` task when both are ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    /// Blocks the entire pipeline; highest priority.
    Blocker,
    /// Critical to the run outcome.
    Critical,
    /// High priority.
    High,
    /// Normal priority (default).
    #[default]
    Medium,
    /// Low priority.
    Low,
    /// Run only when nothing else is ready.
    Deferred,
}

impl Criticality {
    /// Returns the numeric rank (0 = highest priority).
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Blocker => 0,
            Self::Critical => 1,
            Self::High => 2,
            Self::Medium => 3,
            Self::Low => 4,
            Self::Deferred => 5,
        }
    }

    /// Returns true for the labels counted in the critical backlog.
    #[must_use]
    pub fn is_critical(self) -> bool {
        matches!(self, Self::Blocker | Self::Critical)
    }

    /// Returns the label as a string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocker => "blocker",
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Deferred => "deferred",
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
