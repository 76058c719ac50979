//! Task domain model.
//!
//! This module provides:
//! - Criticality labels used for scheduling order
//! - Task specifications with dependencies and resilience settings
//! - The task runner trait and function-based implementations
//! - Immutable per-task results

mod criticality;
mod result;
mod runner;
mod spec;

pub use criticality::Criticality;
pub use result::{FailureKind, TaskResult, TaskStatus};
pub use runner::{FnTask, NoOpTask, TaskRunner};
pub use spec::TaskSpec;
