// src/task/registry.rs

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::errors::PipelineError;
use crate::task::context::TaskContext;

/// Boxed async task action. Actions receive the shared [`TaskContext`] and
/// perform their side effects on the filesystem/network.
pub type TaskAction = Box<
    dyn Fn(Arc<TaskContext>) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>
        + Send
        + Sync,
>;

/// Wrap an async fn (or async closure) into a [`TaskAction`].
pub fn action<F, Fut>(f: F) -> TaskAction
where
    F: Fn(Arc<TaskContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Box::new(move |ctx| Box::pin(f(ctx)))
}

/// A named unit of build work with an ordered prerequisite list.
pub struct Task {
    name: String,
    prerequisites: Vec<String>,
    action: TaskAction,
}

impl Task {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prerequisites(&self) -> &[String] {
        &self.prerequisites
    }

    pub fn action(&self) -> &TaskAction {
        &self.action
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("prerequisites", &self.prerequisites)
            .finish_non_exhaustive()
    }
}

/// Registry of named tasks.
///
/// Registration order must respect dependency order: a prerequisite has to be
/// registered before any task that lists it. This makes cycles
/// unconstructible through the public API; [`TaskRegistry::validate`] still
/// re-checks the whole graph before anything runs.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under a unique name.
    ///
    /// Fails with [`PipelineError::DuplicateTask`] if the name is taken, or
    /// [`PipelineError::UnknownPrerequisite`] if any prerequisite has not
    /// been registered yet.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        prerequisites: &[&str],
        action: TaskAction,
    ) -> Result<(), PipelineError> {
        let name = name.into();

        if self.tasks.contains_key(&name) {
            return Err(PipelineError::DuplicateTask(name));
        }
        for prerequisite in prerequisites {
            if !self.tasks.contains_key(*prerequisite) {
                return Err(PipelineError::UnknownPrerequisite {
                    task: name,
                    prerequisite: (*prerequisite).to_string(),
                });
            }
        }

        debug!(task = %name, prerequisites = ?prerequisites, "registered task");
        self.tasks.insert(
            name.clone(),
            Task {
                name,
                prerequisites: prerequisites.iter().map(|s| s.to_string()).collect(),
                action,
            },
        );
        Ok(())
    }

    /// Look up a task by name.
    pub fn resolve(&self, name: &str) -> Result<&Task, PipelineError> {
        self.tasks
            .get(name)
            .ok_or_else(|| PipelineError::UnknownTask(name.to_string()))
    }

    /// All registered task names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    /// Re-check the whole prerequisite graph for cycles.
    ///
    /// Edge direction: prerequisite -> task; a failed toposort is a cycle.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in self.tasks.keys() {
            graph.add_node(name.as_str());
        }
        for (name, task) in self.tasks.iter() {
            for prerequisite in task.prerequisites() {
                graph.add_edge(prerequisite.as_str(), name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(PipelineError::CyclicDependency(vec![
                cycle.node_id().to_string(),
            ])),
        }
    }

    /// Insert a task without the registration-order checks. Only used by
    /// tests that need to construct graphs the public API rejects.
    #[cfg(test)]
    pub(crate) fn register_unchecked(
        &mut self,
        name: &str,
        prerequisites: &[&str],
        action: TaskAction,
    ) {
        self.tasks.insert(
            name.to_string(),
            Task {
                name: name.to_string(),
                prerequisites: prerequisites.iter().map(|s| s.to_string()).collect(),
                action,
            },
        );
    }
}
