//! Static analysis of task graphs.
//!
//! Validates a submitted task set and derives a read-only summary of its
//! structure before any execution begins. Analysis is re-derivable at any
//! time from the same task set and never mutated.

use crate::errors::{CycleDetectedError, GraphValidationError, TaskflowError};
use crate::task::TaskSpec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Derived summary of a task set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineAnalysis {
    /// Topological layers; every task appears in a stage strictly after
    /// all of its dependencies' stages.
    pub stages: Vec<Vec<String>>,
    /// Width of the widest stage; the maximum safe parallelism.
    pub max_parallelism: usize,
    /// Number of stages; the critical-path length.
    pub critical_path_length: usize,
    /// Tasks ranked most operationally critical, truncated to
    /// `max_parallelism` entries. A capacity-planning hint, not an
    /// execution constraint.
    pub critical_tasks: Vec<String>,
}

/// Validates the task set and computes its stage layering.
///
/// # Errors
///
/// Returns a validation error for an empty task set, duplicate or invalid
/// task names, or an unknown dependency reference, and a cycle error when
/// the graph cannot be fully layered. No partial analysis is returned.
pub fn analyze(tasks: &[TaskSpec]) -> Result<PipelineAnalysis, TaskflowError> {
    if tasks.is_empty() {
        return Err(GraphValidationError::new("Task set cannot be empty").into());
    }

    let mut names: HashSet<&str> = HashSet::with_capacity(tasks.len());
    for task in tasks {
        task.validate()?;
        if !names.insert(task.name.as_str()) {
            return Err(GraphValidationError::new(format!(
                "Duplicate task name '{}'",
                task.name
            ))
            .with_tasks(vec![task.name.clone()])
            .into());
        }
    }

    for task in tasks {
        for dep in &task.dependencies {
            if !names.contains(dep.as_str()) {
                return Err(GraphValidationError::new(format!(
                    "Task '{}' depends on unknown task '{}'",
                    task.name, dep
                ))
                .with_tasks(vec![task.name.clone(), dep.clone()])
                .into());
            }
        }
    }

    let mut in_degree: HashMap<&str, usize> = tasks
        .iter()
        .map(|t| (t.name.as_str(), t.dependencies.len()))
        .collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in tasks {
        for dep in &task.dependencies {
            dependents
                .entry(dep.as_str())
                .or_default()
                .push(task.name.as_str());
        }
    }

    // Kahn-style layering; submission order kept within each stage for
    // deterministic output.
    let mut stages: Vec<Vec<String>> = Vec::new();
    let mut placed: HashSet<&str> = HashSet::with_capacity(tasks.len());
    loop {
        let stage: Vec<&str> = tasks
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| !placed.contains(name) && in_degree[name] == 0)
            .collect();
        if stage.is_empty() {
            break;
        }
        for name in &stage {
            placed.insert(*name);
            for dependent in dependents.get(name).map_or(&[][..], Vec::as_slice) {
                if let Some(count) = in_degree.get_mut(dependent) {
                    *count = count.saturating_sub(1);
                }
            }
        }
        stages.push(stage.into_iter().map(String::from).collect());
    }

    if placed.len() < tasks.len() {
        let remaining: Vec<String> = tasks
            .iter()
            .filter(|t| !placed.contains(t.name.as_str()))
            .map(|t| t.name.clone())
            .collect();
        return Err(CycleDetectedError::new(remaining).into());
    }

    let max_parallelism = stages.iter().map(Vec::len).max().unwrap_or(1).max(1);

    let mut ranked: Vec<&TaskSpec> = tasks.iter().collect();
    ranked.sort_by(|a, b| {
        a.criticality
            .rank()
            .cmp(&b.criticality.rank())
            .then_with(|| b.dependencies.len().cmp(&a.dependencies.len()))
    });
    let critical_tasks: Vec<String> = ranked
        .into_iter()
        .take(max_parallelism)
        .map(|t| t.name.clone())
        .collect();

    Ok(PipelineAnalysis {
        critical_path_length: stages.len(),
        max_parallelism,
        stages,
        critical_tasks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Criticality, NoOpTask};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn task(name: &str, deps: &[&str]) -> TaskSpec {
        TaskSpec::new(name, Arc::new(NoOpTask)).with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_empty_task_set_rejected() {
        assert!(analyze(&[]).is_err());
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let tasks = vec![task("a", &["ghost"])];
        let err = analyze(&tasks).unwrap_err();
        assert!(err.to_string().contains("unknown task 'ghost'"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let tasks = vec![task("a", &[]), task("a", &[])];
        assert!(analyze(&tasks).is_err());
    }

    #[test]
    fn test_diamond_layering() {
        let tasks = vec![
            task("extract", &[]),
            task("transform_a", &["extract"]),
            task("transform_b", &["extract"]),
            task("load", &["transform_a", "transform_b"]),
        ];

        let analysis = analyze(&tasks).unwrap();
        assert_eq!(
            analysis.stages,
            vec![
                vec!["extract".to_string()],
                vec!["transform_a".to_string(), "transform_b".to_string()],
                vec!["load".to_string()],
            ]
        );
        assert_eq!(analysis.max_parallelism, 2);
        assert_eq!(analysis.critical_path_length, 3);
    }

    #[test]
    fn test_layering_is_topological() {
        let tasks = vec![
            task("d", &["b", "c"]),
            task("b", &["a"]),
            task("c", &["a"]),
            task("a", &[]),
        ];

        let analysis = analyze(&tasks).unwrap();
        let stage_of = |name: &str| {
            analysis
                .stages
                .iter()
                .position(|s| s.iter().any(|t| t == name))
                .unwrap()
        };

        for spec in &tasks {
            for dep in &spec.dependencies {
                assert!(stage_of(dep) < stage_of(&spec.name));
            }
        }
    }

    #[test]
    fn test_cycle_never_yields_partial_analysis() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"]), task("c", &[])];

        match analyze(&tasks) {
            Err(TaskflowError::CycleDetected(err)) => {
                assert_eq!(err.remaining, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_critical_tasks_ranking() {
        let tasks = vec![
            task("low_many_deps", &["a", "b"]).with_criticality(Criticality::Low),
            task("blocker", &[]).with_criticality(Criticality::Blocker),
            task("a", &[]),
            task("b", &[]),
            task("critical", &["a"]).with_criticality(Criticality::Critical),
        ];

        let analysis = analyze(&tasks).unwrap();
        assert_eq!(analysis.critical_tasks[0], "blocker");
        assert_eq!(analysis.critical_tasks[1], "critical");
        assert_eq!(analysis.critical_tasks.len(), analysis.max_parallelism);
    }

    #[test]
    fn test_single_task_analysis() {
        let analysis = analyze(&[task("only", &[])]).unwrap();
        assert_eq!(analysis.max_parallelism, 1);
        assert_eq!(analysis.critical_path_length, 1);
        assert_eq!(analysis.critical_tasks, vec!["only".to_string()]);
    }
}
