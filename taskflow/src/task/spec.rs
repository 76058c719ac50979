//! Task specifications.

use super::{Criticality, TaskRunner};
use crate::errors::GraphValidationError;
use crate::resilience::{CircuitBreaker, RetryPolicy};
use std::collections::HashMap;
use std::sync::Arc;

/// Specification for a single task in a pipeline.
///
/// Immutable once submitted to the executor.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    /// The unique name of the task.
    pub name: String,
    /// The task body.
    pub runner: Arc<dyn TaskRunner>,
    /// Names of tasks this task depends on, in declaration order.
    pub dependencies: Vec<String>,
    /// The criticality label used for scheduling order.
    pub criticality: Criticality,
    /// Additional metadata.
    pub metadata: HashMap<String, serde_json::Value>,
    /// Optional retry policy for transient failures.
    pub retry_policy: Option<RetryPolicy>,
    /// Optional circuit breaker, shareable across tasks guarding the
    /// same external resource.
    pub circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl TaskSpec {
    /// Creates a new task specification.
    #[must_use]
    pub fn new(name: impl Into<String>, runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            name: name.into(),
            runner,
            dependencies: Vec::new(),
            criticality: Criticality::default(),
            metadata: HashMap::new(),
            retry_policy: None,
            circuit_breaker: None,
        }
    }

    /// Sets the dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a dependency.
    #[must_use]
    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        self.dependencies.push(dep.into());
        self
    }

    /// Sets the criticality label.
    #[must_use]
    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }

    /// Adds metadata.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sets the circuit breaker.
    #[must_use]
    pub fn with_circuit_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = Some(breaker);
        self
    }

    /// Validates the task specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the task depends on itself.
    pub fn validate(&self) -> Result<(), GraphValidationError> {
        if self.name.trim().is_empty() {
            return Err(GraphValidationError::new(
                "Task name cannot be empty or whitespace-only",
            ));
        }
        if self.dependencies.iter().any(|d| d == &self.name) {
            return Err(GraphValidationError::new(format!(
                "Task '{}' cannot depend on itself",
                self.name
            ))
            .with_tasks(vec![self.name.clone()]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NoOpTask;

    #[test]
    fn test_task_spec_creation() {
        let spec = TaskSpec::new("extract", Arc::new(NoOpTask))
            .with_dependencies(["a", "b"])
            .with_criticality(Criticality::High)
            .with_metadata("owner", serde_json::json!("etl"));

        assert_eq!(spec.name, "extract");
        assert_eq!(spec.dependencies, vec!["a", "b"]);
        assert_eq!(spec.criticality, Criticality::High);
        assert!(spec.metadata.contains_key("owner"));
    }

    #[test]
    fn test_task_spec_self_dependency() {
        let spec = TaskSpec::new("t", Arc::new(NoOpTask)).with_dependency("t");
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_task_spec_empty_name() {
        let spec = TaskSpec::new("   ", Arc::new(NoOpTask));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_task_spec_with_retry_policy() {
        let spec = TaskSpec::new("t", Arc::new(NoOpTask))
            .with_retry_policy(RetryPolicy::new().with_retries(2));

        assert_eq!(spec.retry_policy.unwrap().retries, 2);
    }
}
