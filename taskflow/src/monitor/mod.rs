//! Metrics collaborator interface.
//!
//! The executor reports task start/end events to a [`Monitor`] and reads
//! point-in-time snapshots from it. Transport (HTTP, registries, dashboards)
//! is out of scope; this module ships a no-op sink and an in-memory
//! implementation.

use crate::task::Criticality;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Window for the rolling throughput count.
const THROUGHPUT_WINDOW: Duration = Duration::from_secs(60);

/// Number of latency samples retained for the rolling average.
const LATENCY_SAMPLES: usize = 200;

/// A point-in-time view of pipeline metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    /// Tasks started so far.
    pub total: u64,
    /// Tasks currently running.
    pub running: u64,
    /// Tasks finished successfully.
    pub succeeded: u64,
    /// Tasks finished with a failure.
    pub failed: u64,
    /// Tasks that needed more than one attempt.
    pub retried: u64,
    /// Running tasks with blocker or critical labels.
    pub critical_backlog: u64,
    /// Jobs completed in the last 60 seconds.
    pub recent_completions: u64,
    /// Average latency over the most recent samples, in milliseconds.
    pub avg_latency_ms: f64,
    /// When the snapshot was captured.
    pub captured_at: DateTime<Utc>,
}

/// Collaborator receiving task lifecycle events from the executor.
///
/// Reporting is only required to be eventually consistent per task; no
/// global ordering across tasks is guaranteed.
#[cfg_attr(test, mockall::automock)]
pub trait Monitor: Send + Sync {
    /// Records that a task started.
    fn record_task_start(&self, criticality: Criticality);

    /// Records that a task ended.
    fn record_task_end(
        &self,
        latency_ms: f64,
        success: bool,
        retried: bool,
        criticality: Criticality,
    );

    /// Returns a point-in-time snapshot.
    fn snapshot(&self) -> MonitorSnapshot;
}

/// A monitor that discards all events.
///
/// Used as the default when no monitor is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMonitor;

impl Monitor for NoOpMonitor {
    fn record_task_start(&self, _criticality: Criticality) {}

    fn record_task_end(
        &self,
        _latency_ms: f64,
        _success: bool,
        _retried: bool,
        _criticality: Criticality,
    ) {
    }

    fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            total: 0,
            running: 0,
            succeeded: 0,
            failed: 0,
            retried: 0,
            critical_backlog: 0,
            recent_completions: 0,
            avg_latency_ms: 0.0,
            captured_at: Utc::now(),
        }
    }
}

/// An in-process monitor backed by atomics and bounded rolling windows.
#[derive(Debug, Default)]
pub struct InMemoryMonitor {
    total: AtomicU64,
    running: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
    critical_running: AtomicU64,
    completions: Mutex<VecDeque<Instant>>,
    latencies: Mutex<VecDeque<f64>>,
}

impl InMemoryMonitor {
    /// Creates a new monitor with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn prune_completions(completions: &mut VecDeque<Instant>) {
        let cutoff = Instant::now();
        while let Some(front) = completions.front() {
            if cutoff.duration_since(*front) > THROUGHPUT_WINDOW {
                completions.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Monitor for InMemoryMonitor {
    fn record_task_start(&self, criticality: Criticality) {
        self.total.fetch_add(1, Ordering::SeqCst);
        self.running.fetch_add(1, Ordering::SeqCst);
        if criticality.is_critical() {
            self.critical_running.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn record_task_end(
        &self,
        latency_ms: f64,
        success: bool,
        retried: bool,
        criticality: Criticality,
    ) {
        self.running.fetch_sub(1, Ordering::SeqCst);
        if criticality.is_critical() {
            self.critical_running.fetch_sub(1, Ordering::SeqCst);
        }
        if success {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        } else {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
        if retried {
            self.retried.fetch_add(1, Ordering::SeqCst);
        }

        {
            let mut completions = self.completions.lock();
            completions.push_back(Instant::now());
            Self::prune_completions(&mut completions);
        }
        {
            let mut latencies = self.latencies.lock();
            latencies.push_back(latency_ms);
            while latencies.len() > LATENCY_SAMPLES {
                latencies.pop_front();
            }
        }
    }

    fn snapshot(&self) -> MonitorSnapshot {
        let recent_completions = {
            let mut completions = self.completions.lock();
            Self::prune_completions(&mut completions);
            completions.len() as u64
        };
        let avg_latency_ms = {
            let latencies = self.latencies.lock();
            if latencies.is_empty() {
                0.0
            } else {
                latencies.iter().sum::<f64>() / latencies.len() as f64
            }
        };

        MonitorSnapshot {
            total: self.total.load(Ordering::SeqCst),
            running: self.running.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            retried: self.retried.load(Ordering::SeqCst),
            critical_backlog: self.critical_running.load(Ordering::SeqCst),
            recent_completions,
            avg_latency_ms,
            captured_at: Utc::now(),
        }
    }
}
