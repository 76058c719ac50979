//! Observability utilities.
//!
//! The executor and resilience layers emit structured `tracing` events;
//! this module wires up subscribers for binaries and tests that want to
//! see them.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a human-readable tracing subscriber.
///
/// The filter falls back to `RUST_LOG`, then to the given default. Safe to
/// call more than once; only the first subscriber wins.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// Installs a JSON tracing subscriber for log aggregation.
///
/// Same filter resolution and idempotency as [`init_tracing`].
pub fn init_tracing_json(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().json().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing("taskflow=debug");
        init_tracing("taskflow=info");
        init_tracing_json("taskflow=warn");
    }
}
