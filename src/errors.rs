// src/errors.rs

//! Structured error taxonomy for the pipeline.
//!
//! Configuration-time errors (`DuplicateTask`, `UnknownPrerequisite`,
//! `UnknownTask`, `CyclicDependency`) abort the process before any I/O.
//! `TaskExecution` halts the current run; in watch mode it is caught at the
//! dispatcher boundary and logged instead.

use std::net::SocketAddr;

use thiserror::Error;

pub use anyhow::{Error, Result};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("task '{task}' lists unknown prerequisite '{prerequisite}' (prerequisites must be registered first)")]
    UnknownPrerequisite { task: String, prerequisite: String },

    #[error("no task named '{0}' is registered")]
    UnknownTask(String),

    #[error("task dependency cycle: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    #[error("task '{task}' failed")]
    TaskExecution {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("address {addr} is already in use")]
    PortInUse { addr: SocketAddr },
}
