//! Retry with exponential backoff and jitter.

use super::CircuitBreaker;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Number of retries after the initial attempt.
    pub retries: u32,
    /// Base delay between attempts in milliseconds; doubles each retry.
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds.
    pub max_delay_ms: u64,
    /// Jitter applied to each delay, in milliseconds.
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 30_000,
            jitter_ms: 50,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry count.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay_ms(mut self, delay: u64) -> Self {
        self.base_delay_ms = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay_ms(mut self, delay: u64) -> Self {
        self.max_delay_ms = delay;
        self
    }

    /// Sets the jitter.
    #[must_use]
    pub fn with_jitter_ms(mut self, jitter: u64) -> Self {
        self.jitter_ms = jitter;
        self
    }
}

/// Failure modes of a retried operation.
///
/// Every variant carries the number of attempts already made so callers
/// can account for work done before the operation was abandoned.
#[derive(Debug, Clone, Error)]
pub enum RetryError {
    /// The circuit breaker rejected the next attempt. `attempts` is zero
    /// when the very first attempt was rejected.
    #[error("circuit breaker is open; call rejected")]
    BreakerOpen {
        /// Attempts made before the rejection.
        attempts: u32,
    },

    /// All attempts were exhausted; wraps the last error.
    #[error("retries exhausted after {attempts} attempts: {last_error}")]
    Exhausted {
        /// Total attempts made.
        attempts: u32,
        /// Description of the final error.
        last_error: String,
    },

    /// The run was cancelled between attempts.
    #[error("operation cancelled: {reason}")]
    Cancelled {
        /// Why the run was cancelled.
        reason: String,
        /// Attempts made before cancellation.
        attempts: u32,
    },
}

impl RetryError {
    /// Returns the number of attempts made before the operation gave up.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::BreakerOpen { attempts }
            | Self::Exhausted { attempts, .. }
            | Self::Cancelled { attempts, .. } => *attempts,
        }
    }
}

/// Executes `operation` up to `retries + 1` times with exponential backoff.
///
/// When a breaker is supplied, each attempt is gated on `allow()` and its
/// outcome is reported back. The `cancelled` probe is checked before every
/// attempt so a halted run stops retrying at the next sleep boundary.
///
/// On success, returns the value together with the number of attempts made.
pub async fn retry_with_backoff<T, C, F, Fut>(
    policy: &RetryPolicy,
    breaker: Option<&CircuitBreaker>,
    cancelled: C,
    mut operation: F,
) -> Result<(T, u32), RetryError>
where
    C: Fn() -> bool,
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    let max_attempts = policy.retries + 1;
    let mut delay_ms = policy.base_delay_ms;

    for attempt in 1..=max_attempts {
        if cancelled() {
            return Err(RetryError::Cancelled {
                reason: "run cancelled".to_string(),
                attempts: attempt - 1,
            });
        }
        if let Some(breaker) = breaker {
            if !breaker.allow() {
                return Err(RetryError::BreakerOpen {
                    attempts: attempt - 1,
                });
            }
        }

        match operation().await {
            Ok(value) => {
                if let Some(breaker) = breaker {
                    breaker.record_success();
                }
                return Ok((value, attempt));
            }
            Err(e) => {
                if let Some(breaker) = breaker {
                    breaker.record_failure();
                }
                if attempt == max_attempts {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }

                let sleep_ms = jittered_delay(delay_ms.min(policy.max_delay_ms), policy.jitter_ms);
                tracing::debug!(
                    attempt,
                    delay_ms = sleep_ms,
                    error = %e,
                    "retrying after error"
                );
                tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
                delay_ms = delay_ms.saturating_mul(2);
            }
        }
    }

    // The loop always returns on the final attempt.
    Err(RetryError::Exhausted {
        attempts: max_attempts,
        last_error: "no attempts were made".to_string(),
    })
}

/// Applies `± jitter` to `delay_ms`, clamped at zero.
fn jittered_delay(delay_ms: u64, jitter_ms: u64) -> u64 {
    if jitter_ms == 0 {
        return delay_ms;
    }
    let jitter = rand::thread_rng().gen_range(-(jitter_ms as i64)..=jitter_ms as i64);
    (delay_ms as i64 + jitter).max(0) as u64
}
