//! Benchmarks for executor scheduling and batch planning.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use taskflow::prelude::*;

fn wide_graph(width: usize) -> Vec<TaskSpec> {
    let mut tasks = vec![TaskSpec::new("root", Arc::new(NoOpTask))];
    for i in 0..width {
        tasks.push(
            TaskSpec::new(format!("leaf_{i}"), Arc::new(NoOpTask)).with_dependency("root"),
        );
    }
    tasks
}

fn executor_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    for workers in [1, 4] {
        c.bench_function(&format!("wide_graph_{workers}_workers"), |b| {
            b.iter(|| {
                let executor =
                    PipelineExecutor::new(ExecutorConfig::new().with_max_workers(workers))
                        .unwrap();
                let ctx = Arc::new(RunContext::new(Arc::new(AdaptiveBatcher::default())));
                let report = rt
                    .block_on(executor.run(wide_graph(32), ctx, Arc::new(NoOpMonitor)))
                    .unwrap();
                black_box(report)
            })
        });
    }
}

fn batcher_benchmark(c: &mut Criterion) {
    let batcher = AdaptiveBatcher::default();
    for i in 1..=50 {
        batcher.record_batch_outcome(i * 4, 20.0 + i as f64);
    }

    c.bench_function("suggest_batch_plan", |b| {
        b.iter(|| black_box(batcher.suggest_batch_plan(black_box(1000))))
    });
}

fn queue_benchmark(c: &mut Criterion) {
    c.bench_function("ready_queue_push_pop_1k", |b| {
        b.iter(|| {
            let mut queue = ReadyQueue::new();
            for i in 0..1000u32 {
                queue.push_with_priority(format!("task_{i}"), (i % 6) as u8);
            }
            while let Some(job) = queue.pop() {
                black_box(job);
            }
        })
    });
}

criterion_group!(benches, executor_benchmark, batcher_benchmark, queue_benchmark);
criterion_main!(benches);
