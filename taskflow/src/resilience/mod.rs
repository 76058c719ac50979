//! Failure resilience: retry with backoff and circuit breaking.
//!
//! This module provides:
//! - Retry policies with exponential backoff and jitter
//! - A three-state circuit breaker shareable across tasks

mod breaker;
mod retry;

pub use breaker::CircuitBreaker;
pub use retry::{retry_with_backoff, RetryError, RetryPolicy};
