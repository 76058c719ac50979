//! Task runner trait and implementations.
//!
//! Runners are the fundamental units of work scheduled by the executor.

use crate::context::RunContext;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for task bodies.
///
/// A runner receives the shared run context and either returns an arbitrary
/// JSON result value or fails with an error.
#[async_trait]
pub trait TaskRunner: Send + Sync + Debug {
    /// Executes the unit of work.
    async fn run(&self, ctx: &RunContext) -> anyhow::Result<serde_json::Value>;
}

/// A simple function-based runner.
pub struct FnTask<F>
where
    F: Fn(&RunContext) -> anyhow::Result<serde_json::Value> + Send + Sync,
{
    func: F,
}

impl<F> FnTask<F>
where
    F: Fn(&RunContext) -> anyhow::Result<serde_json::Value> + Send + Sync,
{
    /// Creates a new function-based runner.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Debug for FnTask<F>
where
    F: Fn(&RunContext) -> anyhow::Result<serde_json::Value> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTask").finish()
    }
}

#[async_trait]
impl<F> TaskRunner for FnTask<F>
where
    F: Fn(&RunContext) -> anyhow::Result<serde_json::Value> + Send + Sync,
{
    async fn run(&self, ctx: &RunContext) -> anyhow::Result<serde_json::Value> {
        (self.func)(ctx)
    }
}

/// A no-op runner that returns an empty object.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTask;

#[async_trait]
impl TaskRunner for NoOpTask {
    async fn run(&self, _ctx: &RunContext) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::json!({}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fn_task() {
        let task = FnTask::new(|_ctx| Ok(serde_json::json!({"rows": 10})));
        let ctx = RunContext::new(Arc::new(crate::batch::AdaptiveBatcher::default()));

        let value = task.run(&ctx).await.unwrap();
        assert_eq!(value["rows"], 10);
    }

    #[tokio::test]
    async fn test_noop_task() {
        let task = NoOpTask;
        let ctx = RunContext::new(Arc::new(crate::batch::AdaptiveBatcher::default()));

        let value = task.run(&ctx).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
