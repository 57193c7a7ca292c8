// src/task/mod.rs

//! Task graph: registration, resolution and ordered execution.
//!
//! - [`registry`] holds the named tasks and their prerequisite lists.
//! - [`orchestrator`] turns a requested task into a topological plan and
//!   runs it.
//! - [`context`] is the shared state every action receives.

pub mod context;
pub mod orchestrator;
pub mod registry;

pub use context::TaskContext;
pub use orchestrator::Orchestrator;
pub use registry::{action, Task, TaskAction, TaskRegistry};
