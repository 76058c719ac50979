//! Per-task execution results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final status of a task invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The task completed successfully.
    Success,
    /// The task failed.
    Failed,
}

/// Why a task result is marked failed.
///
/// Distinguishes "the task itself failed" from "the resilience layer
/// refused to run it".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The task body returned an error.
    TaskError,
    /// The circuit breaker rejected the call without running the task.
    BreakerOpen,
    /// All retry attempts were exhausted.
    RetriesExhausted,
    /// The run was cancelled before or during the task.
    Cancelled,
    /// An upstream dependency failed, so the task never ran.
    DependencyFailed,
}

/// The immutable outcome of one task invocation.
///
/// Created exactly once per task per run, unless the run halts before the
/// task is started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// The task name.
    pub name: String,
    /// Success or failure.
    pub status: TaskStatus,
    /// Wall-clock latency of the invocation in milliseconds.
    pub latency_ms: f64,
    /// Number of attempts made (1 when no retry occurred, 0 when the
    /// task never ran).
    pub attempts: u32,
    /// Output value on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Error description on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification, present on failed results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// When the result was recorded.
    pub completed_at: DateTime<Utc>,
}

impl TaskResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(
        name: impl Into<String>,
        output: serde_json::Value,
        latency_ms: f64,
        attempts: u32,
    ) -> Self {
        Self {
            name: name.into(),
            status: TaskStatus::Success,
            latency_ms,
            attempts,
            output: Some(output),
            error: None,
            failure_kind: None,
            completed_at: Utc::now(),
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failure(
        name: impl Into<String>,
        error: impl Into<String>,
        kind: FailureKind,
        latency_ms: f64,
        attempts: u32,
    ) -> Self {
        Self {
            name: name.into(),
            status: TaskStatus::Failed,
            latency_ms,
            attempts,
            output: None,
            error: Some(error.into()),
            failure_kind: Some(kind),
            completed_at: Utc::now(),
        }
    }

    /// Returns true if the task succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}
