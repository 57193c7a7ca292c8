// src/tasks.rs

//! The built-in task table.
//!
//! Registration order matters: prerequisites must be registered before the
//! tasks that list them.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::pipeline::{self, category::AssetCategory};
use crate::task::context::TaskContext;
use crate::task::registry::{action, TaskRegistry};
use crate::watch;

/// Register every built-in task:
///
/// - `lint`, `todo`
/// - `build:html` / `build:js` / `build:styles` / `build:img` / `build:fonts`
///   (`build:js` runs `lint` first)
/// - `build` (all categories)
/// - `clean`
/// - `serve`, `watch`, `default` (= build + serve + watch)
pub fn register_builtin(registry: &mut TaskRegistry) -> Result<(), PipelineError> {
    registry.register("lint", &[], action(pipeline::lint::lint))?;
    registry.register("todo", &[], action(pipeline::notes::todo))?;

    for category in AssetCategory::ALL {
        let prerequisites: &[&str] = if category == AssetCategory::Script {
            &["lint"]
        } else {
            &[]
        };
        registry.register(
            category.task_name(),
            prerequisites,
            action(move |ctx| pipeline::assets::build_category(ctx, category)),
        )?;
    }

    registry.register(
        "build",
        &["build:html", "build:js", "build:styles", "build:fonts", "build:img"],
        action(|_ctx| async {
            debug!("all categories built");
            Ok(())
        }),
    )?;

    registry.register("clean", &[], action(pipeline::clean::clean))?;

    registry.register("serve", &[], action(serve_task))?;
    registry.register("watch", &[], action(watch_task))?;

    registry.register(
        "default",
        &["build", "serve", "watch"],
        action(|_ctx| async {
            info!("pipeline ready; watching for changes (Ctrl-C to stop)");
            Ok(())
        }),
    )?;

    Ok(())
}

async fn serve_task(ctx: Arc<TaskContext>) -> Result<()> {
    ctx.mark_live();
    crate::serve::start(&ctx)
}

async fn watch_task(ctx: Arc<TaskContext>) -> Result<()> {
    ctx.mark_live();

    let orchestrator = ctx
        .orchestrator()
        .context("watch task started before the orchestrator was wired")?;

    let bindings = watch::build_watch_bindings(ctx.config())?;
    let handle = watch::spawn_dispatcher(
        ctx.root().to_path_buf(),
        bindings,
        orchestrator,
        Arc::clone(&ctx),
    )?;
    ctx.hold_watcher(handle);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_registers_and_validates() {
        let mut registry = TaskRegistry::new();
        register_builtin(&mut registry).unwrap();
        registry.validate().unwrap();

        for name in [
            "build", "build:html", "build:js", "build:styles", "build:img", "build:fonts",
            "clean", "lint", "todo", "serve", "watch", "default",
        ] {
            registry.resolve(name).unwrap();
        }
    }

    #[test]
    fn build_js_depends_on_lint() {
        let mut registry = TaskRegistry::new();
        register_builtin(&mut registry).unwrap();
        let task = registry.resolve("build:js").unwrap();
        assert_eq!(task.prerequisites(), ["lint"]);
    }
}
