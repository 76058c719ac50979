//! Error types for the taskflow engine.
//!
//! Configuration and structural errors are raised before any task runs;
//! task-level failures are captured as failed `TaskResult`s instead and
//! never surface through these types directly.

use thiserror::Error;

/// The main error type for taskflow operations.
#[derive(Debug, Error)]
pub enum TaskflowError {
    /// A task-graph validation error occurred.
    #[error("{0}")]
    Validation(#[from] GraphValidationError),

    /// A cycle was detected in the dependency graph.
    #[error("{0}")]
    CycleDetected(#[from] CycleDetectedError),

    /// A generic internal error, such as a deadlocked graph or a worker
    /// join failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error raised when task-graph validation fails.
///
/// Covers unknown dependency references, empty task sets, self-dependencies,
/// duplicate task names, and non-positive configuration parameters.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GraphValidationError {
    /// The error message.
    pub message: String,
    /// The tasks involved in the error.
    pub tasks: Vec<String>,
}

impl GraphValidationError {
    /// Creates a new graph validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tasks: Vec::new(),
        }
    }

    /// Sets the tasks involved.
    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<String>) -> Self {
        self.tasks = tasks;
        self
    }
}

/// Error raised when a cycle is detected in the dependency graph.
///
/// No partial analysis is ever returned alongside this error.
#[derive(Debug, Clone, Error)]
#[error("Cycle detected in task graph; unresolvable tasks: {}", remaining.join(", "))]
pub struct CycleDetectedError {
    /// Tasks that could not be placed into any stage.
    pub remaining: Vec<String>,
}

impl CycleDetectedError {
    /// Creates a new cycle detected error.
    #[must_use]
    pub fn new(remaining: Vec<String>) -> Self {
        Self { remaining }
    }
}

impl From<CycleDetectedError> for GraphValidationError {
    fn from(err: CycleDetectedError) -> Self {
        GraphValidationError {
            message: err.to_string(),
            tasks: err.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_validation_error() {
        let err = GraphValidationError::new("unknown dependency 'x'")
            .with_tasks(vec!["a".to_string()]);

        assert_eq!(err.to_string(), "unknown dependency 'x'");
        assert_eq!(err.tasks, vec!["a".to_string()]);
    }

    #[test]
    fn test_cycle_detected_error() {
        let err = CycleDetectedError::new(vec!["a".to_string(), "b".to_string()]);
        assert!(err.to_string().contains("a, b"));
    }

    #[test]
    fn test_cycle_converts_to_validation() {
        let err = CycleDetectedError::new(vec!["a".to_string()]);
        let validation: GraphValidationError = err.into();
        assert_eq!(validation.tasks, vec!["a".to_string()]);
    }

    #[test]
    fn test_taskflow_error_from_validation() {
        let err: TaskflowError = GraphValidationError::new("empty task set").into();
        assert!(matches!(err, TaskflowError::Validation(_)));
    }

    #[test]
    fn test_internal_error_display() {
        let err = TaskflowError::Internal("Deadlocked task graph".to_string());
        assert_eq!(err.to_string(), "Internal error: Deadlocked task graph");
    }
}
