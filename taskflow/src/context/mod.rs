//! Shared execution context for a pipeline run.
//!
//! This module provides:
//! - Run identity for correlating metrics and logs
//! - The thread-safe `RunContext` passed to every task invocation
//!
//! A context lives for exactly one execution run.

use crate::batch::{AdaptiveBatcher, BatchPlan};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Identity of a single execution run.
#[derive(Debug, Clone)]
pub struct RunIdentity {
    /// Unique run ID.
    pub run_id: Uuid,
    /// When the run was created.
    pub started_at: DateTime<Utc>,
}

impl RunIdentity {
    /// Creates a fresh run identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

/// The mutable, thread-safe context shared by every task in a run.
///
/// Exposes batch-plan requests, batch-outcome recording, an arbitrary
/// key/value bag for cross-task custom metrics, and the run-level
/// cancellation flag.
pub struct RunContext {
    identity: RunIdentity,
    batcher: Arc<AdaptiveBatcher>,
    batch_log: RwLock<Vec<BatchPlan>>,
    metrics: DashMap<String, serde_json::Value>,
    cancelled: AtomicBool,
    cancel_reason: RwLock<Option<String>>,
}

impl RunContext {
    /// Creates a new run context backed by the given batcher.
    #[must_use]
    pub fn new(batcher: Arc<AdaptiveBatcher>) -> Self {
        Self {
            identity: RunIdentity::new(),
            batcher,
            batch_log: RwLock::new(Vec::new()),
            metrics: DashMap::new(),
            cancelled: AtomicBool::new(false),
            cancel_reason: RwLock::new(None),
        }
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Requests a batch sizing recommendation for `pending_records`.
    ///
    /// Every plan handed out is also appended to the run's batch-plan log.
    #[must_use]
    pub fn request_batch_plan(&self, pending_records: usize) -> BatchPlan {
        let plan = self.batcher.suggest_batch_plan(pending_records);
        self.batch_log.write().push(plan);
        plan
    }

    /// Records the observed outcome of a batch.
    ///
    /// # Panics
    ///
    /// Panics if `size` or `latency_ms` is not positive.
    pub fn record_batch_outcome(&self, size: usize, latency_ms: f64) {
        self.batcher.record_batch_outcome(size, latency_ms);
    }

    /// Returns all batch plans requested during this run.
    #[must_use]
    pub fn batch_plans(&self) -> Vec<BatchPlan> {
        self.batch_log.read().clone()
    }

    /// Sets a custom metric, overwriting any previous value.
    pub fn set_metric(&self, key: impl Into<String>, value: serde_json::Value) {
        self.metrics.insert(key.into(), value);
    }

    /// Gets a custom metric.
    #[must_use]
    pub fn get_metric(&self, key: &str) -> Option<serde_json::Value> {
        self.metrics.get(key).map(|v| v.clone())
    }

    /// Returns a point-in-time copy of all custom metrics.
    #[must_use]
    pub fn metrics(&self) -> HashMap<String, serde_json::Value> {
        self.metrics
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Marks the run as cancelled.
    pub fn mark_cancelled(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Marks the run as cancelled with a reason.
    pub fn mark_cancelled_with_reason(&self, reason: impl Into<String>) {
        self.cancelled.store(true, Ordering::SeqCst);
        *self.cancel_reason.write() = Some(reason.into());
    }

    /// Checks whether the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<String> {
        self.cancel_reason.read().clone()
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("run_id", &self.identity.run_id)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> RunContext {
        RunContext::new(Arc::new(AdaptiveBatcher::default()))
    }

    #[test]
    fn test_run_identity_unique() {
        let a = RunIdentity::new();
        let b = RunIdentity::new();
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn test_batch_plan_logged() {
        let ctx = test_context();
        assert!(ctx.batch_plans().is_empty());

        let plan = ctx.request_batch_plan(10);
        assert_eq!(ctx.batch_plans(), vec![plan]);
    }

    #[test]
    fn test_custom_metrics() {
        let ctx = test_context();
        ctx.set_metric("rows_loaded", serde_json::json!(120));

        assert_eq!(ctx.get_metric("rows_loaded"), Some(serde_json::json!(120)));
        assert!(ctx.get_metric("missing").is_none());
        assert_eq!(ctx.metrics().len(), 1);
    }

    #[test]
    fn test_cancellation() {
        let ctx = test_context();
        assert!(!ctx.is_cancelled());

        ctx.mark_cancelled_with_reason("task 'load' failed");
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.cancel_reason(), Some("task 'load' failed".to_string()));
    }

    #[test]
    fn test_outcome_feeds_batcher() {
        let batcher = Arc::new(AdaptiveBatcher::default());
        let ctx = RunContext::new(batcher.clone());

        ctx.record_batch_outcome(10, 25.0);
        assert_eq!(batcher.history_len(), 1);
    }
}
