// src/task/orchestrator.rs

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::task::context::TaskContext;
use crate::task::registry::TaskRegistry;

/// Resolves a requested task plus its transitive prerequisites into a linear
/// execution order and runs the actions in that order.
///
/// Ordering is guaranteed only between named tasks; per-file concurrency
/// inside one task is that task's own business.
pub struct Orchestrator {
    registry: TaskRegistry,
}

impl Orchestrator {
    pub fn new(registry: TaskRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Depth-first traversal producing a topological order: every reachable
    /// task appears exactly once, after all of its prerequisites.
    ///
    /// A task revisited while still on the traversal path means a cycle;
    /// the error names the offending path before any action has run.
    pub fn plan(&self, name: &str) -> Result<Vec<String>, PipelineError> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut path = Vec::new();
        self.visit(name, &mut path, &mut done, &mut order)?;
        Ok(order)
    }

    fn visit(
        &self,
        name: &str,
        path: &mut Vec<String>,
        done: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<(), PipelineError> {
        if done.contains(name) {
            return Ok(());
        }
        if let Some(pos) = path.iter().position(|p| p == name) {
            let mut cycle: Vec<String> = path[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(PipelineError::CyclicDependency(cycle));
        }

        let task = self.registry.resolve(name)?;

        path.push(name.to_string());
        for prerequisite in task.prerequisites() {
            self.visit(prerequisite, path, done, order)?;
        }
        path.pop();

        done.insert(name.to_string());
        order.push(name.to_string());
        Ok(())
    }

    /// Run `name` and its transitive prerequisites.
    ///
    /// Actions execute sequentially in plan order. The first failure halts
    /// the run and surfaces [`PipelineError::TaskExecution`]; outputs already
    /// written by completed tasks stay on disk.
    pub async fn run(&self, name: &str, ctx: Arc<TaskContext>) -> Result<(), PipelineError> {
        let order = self.plan(name)?;
        info!(task = name, order = ?order, "task plan resolved");

        for task_name in &order {
            let task = self.registry.resolve(task_name)?;
            debug!(task = %task_name, "running task action");

            (task.action())(Arc::clone(&ctx))
                .await
                .map_err(|source| PipelineError::TaskExecution {
                    task: task_name.clone(),
                    source,
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::registry::{action, TaskAction};
    use std::sync::Mutex;

    fn noop() -> TaskAction {
        action(|_ctx| async { Ok(()) })
    }

    fn diamond() -> Orchestrator {
        // base <- left, base <- right, top <- left + right
        let mut registry = TaskRegistry::new();
        registry.register("base", &[], noop()).unwrap();
        registry.register("left", &["base"], noop()).unwrap();
        registry.register("right", &["base"], noop()).unwrap();
        registry.register("top", &["left", "right"], noop()).unwrap();
        Orchestrator::new(registry)
    }

    #[test]
    fn plan_orders_prerequisites_first_and_once() {
        let orchestrator = diamond();
        let order = orchestrator.plan("top").unwrap();

        assert_eq!(order.len(), 4, "each task exactly once: {order:?}");
        let pos = |n: &str| order.iter().position(|t| t == n).unwrap();
        assert!(pos("base") < pos("left"));
        assert!(pos("base") < pos("right"));
        assert!(pos("left") < pos("top"));
        assert!(pos("right") < pos("top"));
    }

    #[test]
    fn plan_of_leaf_is_just_the_leaf() {
        let orchestrator = diamond();
        assert_eq!(orchestrator.plan("base").unwrap(), vec!["base"]);
    }

    #[test]
    fn unknown_task_fails() {
        let orchestrator = diamond();
        let err = orchestrator.plan("missing").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownTask(name) if name == "missing"));
    }

    #[test]
    fn cycle_is_reported_with_its_path_before_any_action_runs() {
        let ran = Arc::new(Mutex::new(Vec::<String>::new()));

        let mut registry = TaskRegistry::new();
        for name in ["a", "b", "c"] {
            let ran = Arc::clone(&ran);
            let name_owned = name.to_string();
            registry.register_unchecked(
                name,
                match name {
                    "a" => &["c"],
                    "b" => &["a"],
                    _ => &["b"],
                },
                action(move |_ctx| {
                    let ran = Arc::clone(&ran);
                    let name = name_owned.clone();
                    async move {
                        ran.lock().unwrap().push(name);
                        Ok(())
                    }
                }),
            );
        }

        let orchestrator = Orchestrator::new(registry);
        let err = orchestrator.plan("a").unwrap_err();
        match err {
            PipelineError::CyclicDependency(cycle) => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.len() >= 3, "cycle path too short: {cycle:?}");
            }
            other => panic!("expected CyclicDependency, got {other:?}"),
        }
        assert!(ran.lock().unwrap().is_empty(), "no action may run");
    }
}
