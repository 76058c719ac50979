//! Run reports and executor state.

use crate::analysis::PipelineAnalysis;
use crate::task::TaskResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State machine for one execution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// The run has been created but not validated.
    Initializing,
    /// Static analysis is in progress.
    Validating,
    /// Tasks are being scheduled and executed.
    Running,
    /// All tasks finished.
    Completed,
    /// The run stopped early on a non-continuable failure.
    Halted,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Initializing => "initializing",
            Self::Validating => "validating",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Halted => "halted",
        };
        f.write_str(name)
    }
}

/// Outcome of one execution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Results keyed by task name. On a halted run, only tasks that
    /// completed or were already in flight have entries.
    pub results: HashMap<String, TaskResult>,
    /// The pre-execution static analysis.
    pub analysis: PipelineAnalysis,
    /// Final state, `Completed` or `Halted`.
    pub state: RunState,
    /// The task whose failure halted the run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted_task: Option<String>,
    /// The error that halted the run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: f64,
}

impl PipelineReport {
    /// Returns true when the run completed with every task succeeding.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == RunState::Completed && self.results.values().all(TaskResult::is_success)
    }

    /// Number of successful tasks.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.values().filter(|r| r.is_success()).count()
    }

    /// Number of failed tasks.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.values().filter(|r| !r.is_success()).count()
    }
}
