//! The task-graph scheduler and executor.
//!
//! Tasks are executed as soon as their dependencies are satisfied, up to a
//! fixed worker-pool width, with ready work drained from a criticality
//! ordered queue and every invocation reported to the monitor.

mod report;


pub use report::{PipelineReport, RunState};

use crate::analysis;
use crate::context::RunContext;
use crate::errors::{GraphValidationError, TaskflowError};
use crate::monitor::Monitor;
use crate::queue::ReadyQueue;
use crate::resilience::{retry_with_backoff, RetryError};
use crate::task::{FailureKind, TaskResult, TaskSpec};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

/// Configuration for a pipeline executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Width of the worker pool.
    pub max_workers: usize,
    /// When true, a task failure is recorded and unrelated branches keep
    /// running; when false (default), the first failure halts the run.
    pub continue_on_failure: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_workers: 4,
            continue_on_failure: false,
        }
    }
}

impl ExecutorConfig {
    /// Creates a new config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker-pool width.
    #[must_use]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Enables continue-on-failure mode.
    #[must_use]
    pub fn continue_on_failure(mut self) -> Self {
        self.continue_on_failure = true;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_workers` is zero.
    pub fn validate(&self) -> Result<(), GraphValidationError> {
        if self.max_workers == 0 {
            return Err(GraphValidationError::new("max_workers must be >= 1"));
        }
        Ok(())
    }
}

/// Schedules and executes a task graph with a fixed-size worker pool.
#[derive(Debug, Clone)]
pub struct PipelineExecutor {
    config: ExecutorConfig,
}

impl PipelineExecutor {
    /// Creates a new executor.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ExecutorConfig) -> Result<Self, TaskflowError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the executor configuration.
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs the task set to completion.
    ///
    /// Validation happens first; any configuration or structural error is
    /// returned before a single task runs. Task-level failures are captured
    /// in the report instead, halting the run unless continue-on-failure
    /// is configured.
    ///
    /// # Errors
    ///
    /// Returns validation and structural errors, or an internal error when
    /// the scheduler cannot make progress.
    pub async fn run(
        &self,
        tasks: Vec<TaskSpec>,
        ctx: Arc<RunContext>,
        monitor: Arc<dyn Monitor>,
    ) -> Result<PipelineReport, TaskflowError> {
        let start = Instant::now();
        let total = tasks.len();

        tracing::info!(
            run_id = %ctx.identity().run_id,
            tasks = total,
            state = %RunState::Validating,
            "validating task graph"
        );
        let analysis = analysis::analyze(&tasks)?;

        let specs: HashMap<String, TaskSpec> = tasks
            .iter()
            .map(|t| (t.name.clone(), t.clone()))
            .collect();
        let mut remaining: HashMap<String, usize> = tasks
            .iter()
            .map(|t| (t.name.clone(), t.dependencies.len()))
            .collect();
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        for task in &tasks {
            for dep in &task.dependencies {
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .push(task.name.clone());
            }
        }

        let mut queue = ReadyQueue::new();
        for task in &tasks {
            if task.dependencies.is_empty() {
                queue.push_task(&task.name, task.criticality);
            }
        }

        let mut in_flight: FuturesUnordered<tokio::task::JoinHandle<(String, TaskResult)>> =
            FuturesUnordered::new();
        let mut results: HashMap<String, TaskResult> = HashMap::with_capacity(total);
        // Tasks with a failed (transitive) dependency; they are settled as
        // failed without ever starting.
        let mut poisoned: HashSet<String> = HashSet::new();

        let mut state = RunState::Running;
        let mut halted_task = None;
        let mut halt_error = None;

        tracing::info!(
            run_id = %ctx.identity().run_id,
            max_workers = self.config.max_workers,
            stages = analysis.critical_path_length,
            "run started"
        );

        loop {
            while in_flight.len() < self.config.max_workers {
                let Some(job) = queue.pop() else { break };
                let spec = specs
                    .get(&job.task_name)
                    .ok_or_else(|| {
                        TaskflowError::Internal(format!("unknown queued task '{}'", job.task_name))
                    })?
                    .clone();
                let ctx = ctx.clone();
                let monitor = monitor.clone();
                in_flight.push(tokio::spawn(async move {
                    invoke_task(spec, &ctx, monitor.as_ref()).await
                }));
            }

            if in_flight.is_empty() {
                if results.len() < total {
                    let pending: Vec<&String> =
                        remaining.keys().filter(|n| !results.contains_key(*n)).collect();
                    return Err(TaskflowError::Internal(format!(
                        "Deadlocked task graph; remaining tasks: {pending:?}"
                    )));
                }
                break;
            }

            let Some(joined) = in_flight.next().await else { break };
            let (name, result) = joined
                .map_err(|e| TaskflowError::Internal(format!("Task join error: {e}")))?;

            let failed = !result.is_success();
            let error = result.error.clone();
            results.insert(name.clone(), result);

            if failed && !self.config.continue_on_failure {
                let reason = format!("task '{name}' failed");
                ctx.mark_cancelled_with_reason(&reason);
                let dropped = queue.clear();
                tracing::warn!(task = %name, dropped, "halting run on task failure");

                // Best-effort: already-started tasks observe the cancelled
                // context; await them so their results are recorded.
                while let Some(joined) = in_flight.next().await {
                    if let Ok((n, r)) = joined {
                        results.insert(n, r);
                    }
                }

                state = RunState::Halted;
                halted_task = Some(name);
                halt_error = error;
                break;
            }

            // Settle dependents; failures cascade so every task still gets
            // exactly one result in continue-on-failure mode.
            let mut settled: VecDeque<(String, bool)> = VecDeque::from([(name, failed)]);
            while let Some((done, done_failed)) = settled.pop_front() {
                for dependent in dependents.get(&done).cloned().unwrap_or_default() {
                    if done_failed {
                        poisoned.insert(dependent.clone());
                    }
                    let Some(count) = remaining.get_mut(&dependent) else {
                        continue;
                    };
                    *count = count.saturating_sub(1);
                    if *count > 0 {
                        continue;
                    }
                    if poisoned.contains(&dependent) {
                        let result = TaskResult::failure(
                            &dependent,
                            format!("dependency '{done}' failed"),
                            FailureKind::DependencyFailed,
                            0.0,
                            0,
                        );
                        results.insert(dependent.clone(), result);
                        settled.push_back((dependent, true));
                    } else if let Some(spec) = specs.get(&dependent) {
                        queue.push_task(&dependent, spec.criticality);
                    }
                }
            }
        }

        if state == RunState::Running {
            state = RunState::Completed;
        }

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            run_id = %ctx.identity().run_id,
            state = %state,
            succeeded = results.values().filter(|r| r.is_success()).count(),
            failed = results.values().filter(|r| !r.is_success()).count(),
            duration_ms,
            "run finished"
        );

        Ok(PipelineReport {
            results,
            analysis,
            state,
            halted_task,
            error: halt_error,
            duration_ms,
        })
    }
}

/// Runs one task invocation through the resilience layer, reporting start
/// and end to the monitor.
async fn invoke_task(spec: TaskSpec, ctx: &RunContext, monitor: &dyn Monitor) -> (String, TaskResult) {
    let name = spec.name.clone();
    monitor.record_task_start(spec.criticality);
    tracing::debug!(task = %name, criticality = %spec.criticality, "task started");

    let start = Instant::now();
    let mut attempts: u32 = 1;
    let mut retried = false;

    let outcome: Result<serde_json::Value, (String, FailureKind)> = if ctx.is_cancelled() {
        attempts = 0;
        Err((
            ctx.cancel_reason()
                .unwrap_or_else(|| "run cancelled".to_string()),
            FailureKind::Cancelled,
        ))
    } else if let Some(policy) = spec.retry_policy.as_ref() {
        let result = retry_with_backoff(
            policy,
            spec.circuit_breaker.as_deref(),
            || ctx.is_cancelled(),
            || spec.runner.run(ctx),
        )
        .await;
        match result {
            Ok((value, n)) => {
                attempts = n;
                retried = n > 1;
                Ok(value)
            }
            Err(err) => {
                // Attempts made before giving up still count toward the
                // result and the retried flag.
                attempts = err.attempts();
                retried = attempts > 1;
                let kind = match &err {
                    RetryError::BreakerOpen { .. } => FailureKind::BreakerOpen,
                    RetryError::Exhausted { .. } => FailureKind::RetriesExhausted,
                    RetryError::Cancelled { .. } => FailureKind::Cancelled,
                };
                Err((err.to_string(), kind))
            }
        }
    } else if let Some(breaker) = spec.circuit_breaker.as_ref() {
        if breaker.allow() {
            match spec.runner.run(ctx).await {
                Ok(value) => {
                    breaker.record_success();
                    Ok(value)
                }
                Err(e) => {
                    breaker.record_failure();
                    Err((e.to_string(), FailureKind::TaskError))
                }
            }
        } else {
            attempts = 0;
            Err((
                "circuit breaker is open; call rejected".to_string(),
                FailureKind::BreakerOpen,
            ))
        }
    } else {
        spec.runner
            .run(ctx)
            .await
            .map_err(|e| (e.to_string(), FailureKind::TaskError))
    };

    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    let success = outcome.is_ok();
    monitor.record_task_end(latency_ms, success, retried, spec.criticality);

    let result = match outcome {
        Ok(value) => {
            tracing::debug!(task = %name, latency_ms, "task completed");
            TaskResult::success(&name, value, latency_ms, attempts)
        }
        Err((error, kind)) => {
            tracing::warn!(task = %name, error = %error, "task failed");
            TaskResult::failure(&name, error, kind, latency_ms, attempts)
        }
    };
    (name, result)
}
