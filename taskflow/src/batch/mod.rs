//! Adaptive batch-size planning.
//!
//! The batcher keeps a bounded sliding history of observed (size, latency)
//! pairs and proposes batch sizes that balance throughput against a
//! per-batch latency objective.

use crate::errors::GraphValidationError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of observations retained.
const HISTORY_CAP: usize = 50;

/// Floor for the latency-per-record slope, preventing runaway sizes when
/// observed latencies are near zero.
const MIN_SLOPE: f64 = 0.1;

/// A batch sizing recommendation.
///
/// Immutable value, consumed immediately by the requester.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchPlan {
    /// Recommended batch size in records.
    pub size: usize,
    /// Predicted latency for a batch of this size, in milliseconds.
    pub expected_latency_ms: f64,
    /// Predicted throughput in records per second.
    pub expected_throughput: f64,
}

/// Feedback-controlled batch-size estimator.
///
/// Shared across workers; history mutation is a single critical section.
#[derive(Debug)]
pub struct AdaptiveBatcher {
    min_size: usize,
    max_size: usize,
    latency_slo_ms: f64,
    history: Mutex<VecDeque<(usize, f64)>>,
}

impl Default for AdaptiveBatcher {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 512,
            latency_slo_ms: 250.0,
            history: Mutex::new(VecDeque::new()),
        }
    }
}

impl AdaptiveBatcher {
    /// Creates a new batcher.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_size` is zero, `max_size` is below
    /// `min_size`, or the latency objective is not positive.
    pub fn new(
        min_size: usize,
        max_size: usize,
        latency_slo_ms: f64,
    ) -> Result<Self, GraphValidationError> {
        if min_size == 0 {
            return Err(GraphValidationError::new("min_size must be >= 1"));
        }
        if max_size < min_size {
            return Err(GraphValidationError::new(
                "max_size must be >= min_size",
            ));
        }
        if latency_slo_ms <= 0.0 {
            return Err(GraphValidationError::new(
                "latency_slo_ms must be positive",
            ));
        }
        Ok(Self {
            min_size,
            max_size,
            latency_slo_ms,
            history: Mutex::new(VecDeque::new()),
        })
    }

    /// Returns the configured minimum batch size.
    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Returns the configured maximum batch size.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the number of retained observations.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// Proposes a batch plan for the given number of pending records.
    ///
    /// The suggestion is clamped to the configured bounds and to
    /// `pending_records`, except that a backlog smaller than `min_size`
    /// still receives a plan of at least `min_size`; the caller's final
    /// batch may simply come up short.
    #[must_use]
    pub fn suggest_batch_plan(&self, pending_records: usize) -> BatchPlan {
        let history = self.history.lock();

        if history.is_empty() {
            let size = self.min_size.max(pending_records).min(self.max_size);
            let expected_latency_ms = size as f64 * 1.2;
            return BatchPlan {
                size,
                expected_latency_ms,
                expected_throughput: throughput(size, expected_latency_ms),
            };
        }

        let count = history.len() as f64;
        let avg_latency: f64 = history.iter().map(|(_, l)| l).sum::<f64>() / count;
        let avg_size: f64 = history.iter().map(|(s, _)| *s as f64).sum::<f64>() / count;
        drop(history);

        let slope = (avg_latency / avg_size.max(1.0)).max(MIN_SLOPE);

        let mut size = (self.latency_slo_ms / slope) as usize;
        size = size.clamp(self.min_size, self.max_size);
        if pending_records >= self.min_size {
            size = size.min(pending_records);
        }
        let mut expected_latency_ms = slope * size as f64;

        // Back off before breaching the objective.
        if avg_latency > self.latency_slo_ms * 0.9 {
            size = ((size as f64 * 0.85) as usize).max(self.min_size).max(1);
            expected_latency_ms *= 0.9;
        }

        BatchPlan {
            size,
            expected_latency_ms,
            expected_throughput: throughput(size, expected_latency_ms),
        }
    }

    /// Records the observed outcome of a batch.
    ///
    /// # Panics
    ///
    /// Panics if `size` or `latency_ms` is not positive; these are caller
    /// contract violations, not runtime conditions.
    pub fn record_batch_outcome(&self, size: usize, latency_ms: f64) {
        assert!(size > 0, "batch outcome size must be positive");
        assert!(latency_ms > 0.0, "batch outcome latency must be positive");

        let mut history = self.history.lock();
        history.push_back((size, latency_ms));
        while history.len() > HISTORY_CAP {
            history.pop_front();
        }
    }
}

/// Records-per-second throughput for a batch of `size` taking `latency_ms`.
fn throughput(size: usize, latency_ms: f64) -> f64 {
    if latency_ms <= 0.0 {
        return 0.0;
    }
    size as f64 / latency_ms * 1000.0
}

/// Splits `items` into a lazy, one-shot sequence of groups of `plan.size`.
///
/// The final group may be smaller than the plan size.
pub fn batch_iter<T>(items: Vec<T>, plan: &BatchPlan) -> impl Iterator<Item = Vec<T>> {
    let size = plan.size.max(1);
    let mut iter = items.into_iter();
    std::iter::from_fn(move || {
        let chunk: Vec<T> = iter.by_ref().take(size).collect();
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    })
}
