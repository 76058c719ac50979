//! Circuit breaker guarding calls to failing dependencies.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Internal breaker state.
///
/// Modeled as an explicit tagged enum so that trial bookkeeping in the
/// half-open phase is unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    /// Calls allowed; counts consecutive failures.
    Closed { consecutive_failures: u32 },
    /// All calls rejected until the recovery timeout elapses.
    Open { opened_at: Instant },
    /// Trial calls allowed; counts consecutive trial successes.
    HalfOpen { successes: u32 },
}

/// A guard that stops calling a failing dependency until it has had time
/// to recover.
///
/// One instance is typically shared (via `Arc`) by every task touching the
/// same external resource. State accumulates across the whole process
/// lifetime, not per run.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    recovery_timeout: Duration,
    half_open_success_threshold: u32,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Creates a new breaker in the closed state.
    #[must_use]
    pub fn new(
        failure_threshold: u32,
        recovery_timeout: Duration,
        half_open_success_threshold: u32,
    ) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            recovery_timeout,
            half_open_success_threshold: half_open_success_threshold.max(1),
            state: Mutex::new(BreakerState::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    /// Returns whether a call is currently permitted.
    ///
    /// The first call after the recovery timeout transitions the breaker
    /// to half-open and is allowed through as a trial.
    #[must_use]
    pub fn allow(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Closed { .. } | BreakerState::HalfOpen { .. } => true,
            BreakerState::Open { opened_at } => {
                if opened_at.elapsed() >= self.recovery_timeout {
                    *state = BreakerState::HalfOpen { successes: 0 };
                    tracing::debug!("circuit breaker half-open, allowing trial call");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Records a successful call.
    pub fn record_success(&self) {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Closed { .. } => {
                *state = BreakerState::Closed {
                    consecutive_failures: 0,
                };
            }
            BreakerState::HalfOpen { successes } => {
                let successes = successes + 1;
                if successes >= self.half_open_success_threshold {
                    *state = BreakerState::Closed {
                        consecutive_failures: 0,
                    };
                    tracing::debug!("circuit breaker closed after successful trials");
                } else {
                    *state = BreakerState::HalfOpen { successes };
                }
            }
            BreakerState::Open { .. } => {}
        }
    }

    /// Records a failed call.
    ///
    /// A failure during the half-open phase reopens the breaker immediately.
    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        match *state {
            BreakerState::Closed {
                consecutive_failures,
            } => {
                let consecutive_failures = consecutive_failures + 1;
                if consecutive_failures >= self.failure_threshold {
                    *state = BreakerState::Open {
                        opened_at: Instant::now(),
                    };
                    tracing::warn!(
                        failures = consecutive_failures,
                        "circuit breaker opened"
                    );
                } else {
                    *state = BreakerState::Closed {
                        consecutive_failures,
                    };
                }
            }
            BreakerState::HalfOpen { .. } => {
                *state = BreakerState::Open {
                    opened_at: Instant::now(),
                };
                tracing::warn!("circuit breaker reopened after trial failure");
            }
            BreakerState::Open { .. } => {}
        }
    }

    /// Returns the current state name for observability.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        match *self.state.lock() {
            BreakerState::Closed { .. } => "closed",
            BreakerState::Open { .. } => "open",
            BreakerState::HalfOpen { .. } => "half_open",
        }
    }
}
