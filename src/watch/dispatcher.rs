// src/watch/dispatcher.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::pipeline::category::AssetCategory;
use crate::pipeline::scan::relative_str;
use crate::task::context::TaskContext;
use crate::task::orchestrator::Orchestrator;
use crate::watch::patterns::WatchBinding;

/// Quiet window for coalescing change bursts: an editor save that touches a
/// path several times within this window triggers each bound task once.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Tasks matched by one debounced event batch, with the source paths that
/// matched per category.
#[derive(Debug, Default)]
struct Batch {
    /// task name -> (category, matched source paths)
    pending: BTreeMap<String, (AssetCategory, BTreeSet<String>)>,
}

impl Batch {
    fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn collect(&mut self, root: &std::path::Path, bindings: &[WatchBinding], event: &Event) {
        // Pure access events never change content; skip them outright.
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }

        for path in &event.paths {
            let Some(rel) = relative_str(root, path) else {
                continue;
            };
            for binding in bindings {
                if !binding.matches(&rel) {
                    continue;
                }
                debug!(
                    category = %binding.category(),
                    path = %rel,
                    "watch match"
                );
                for task in binding.tasks() {
                    self.pending
                        .entry(task.clone())
                        .or_insert_with(|| (binding.category(), BTreeSet::new()))
                        .1
                        .insert(rel.clone());
                }
            }
        }
    }
}

/// Spawn a filesystem watcher observing the project root recursively.
///
/// Change events are debounced into batches; each batch re-runs every matched
/// task once via the orchestrator and then notifies connected reload clients
/// with the changed category. A failed re-run is logged and the watcher keeps
/// listening.
pub fn spawn_dispatcher(
    root: impl Into<PathBuf>,
    bindings: Vec<WatchBinding>,
    orchestrator: Arc<Orchestrator>,
    ctx: Arc<TaskContext>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    warn!(error = %err, "failed to forward notify event");
                }
            }
            Err(err) => {
                warn!(error = %err, "file watch error");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("file watcher started on {:?}", root);

    let bindings = Arc::new(bindings);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let mut batch = Batch::default();
            batch.collect(&root, &bindings, &event);

            // Drain the burst: keep folding events in until the window
            // passes with no new activity.
            loop {
                match tokio::time::timeout(DEBOUNCE_WINDOW, event_rx.recv()).await {
                    Ok(Some(event)) => batch.collect(&root, &bindings, &event),
                    Ok(None) => {
                        dispatch_batch(&orchestrator, &ctx, batch).await;
                        debug!("watch dispatcher loop ended (event channel closed)");
                        return;
                    }
                    Err(_elapsed) => break,
                }
            }

            dispatch_batch(&orchestrator, &ctx, batch).await;
        }

        debug!("watch dispatcher loop ended");
    });

    Ok(WatcherHandle { _inner: watcher })
}

async fn dispatch_batch(orchestrator: &Orchestrator, ctx: &Arc<TaskContext>, batch: Batch) {
    if batch.is_empty() {
        return;
    }

    for (task, (category, paths)) in batch.pending {
        info!(task = %task, category = %category, changed = paths.len(), "change detected");

        match orchestrator.run(&task, Arc::clone(ctx)).await {
            Ok(()) => {
                let affected: Vec<String> = paths.into_iter().collect();
                ctx.reload().notify(category, &affected);
            }
            Err(err) => {
                // Watch mode survives failed re-runs; the next change gets
                // another chance.
                warn!(task = %task, error = %format!("{err:#}"), "re-run failed; still watching");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::patterns::build_watch_bindings;
    use notify::event::{EventKind, ModifyKind};
    use std::path::Path;

    fn config() -> crate::config::model::ConfigFile {
        toml::from_str(
            r#"
            [paths.markup]
            src = "src/pug/pages/*.pug"
            watch = "src/pug/**/*"
            dest = "build/"

            [paths.script]
            src = "src/js/app.js"
            watch = "src/js/**/*"
            dest = "build/js/"

            [paths.style]
            src = "src/sass/app.scss"
            watch = "src/sass/**/*.scss"
            dest = "build/css/"

            [paths.image]
            src = "src/img/**/*"
            watch = "src/img/**/*"
            dest = "build/img/"

            [paths.font]
            src = "src/fonts/**/*"
            watch = "src/fonts/**/*"
            dest = "build/fonts/"
            "#,
        )
        .unwrap()
    }

    fn modify_event(paths: &[&str]) -> Event {
        let mut event = Event::new(EventKind::Modify(ModifyKind::Any));
        for p in paths {
            event = event.add_path(PathBuf::from(p));
        }
        event
    }

    #[test]
    fn scss_change_triggers_only_the_styles_task() {
        let bindings = build_watch_bindings(&config()).unwrap();
        let root = Path::new("/proj");

        let mut batch = Batch::default();
        batch.collect(root, &bindings, &modify_event(&["/proj/src/sass/app.scss"]));

        let tasks: Vec<_> = batch.pending.keys().cloned().collect();
        assert_eq!(tasks, vec!["build:styles"]);
    }

    #[test]
    fn non_matching_change_triggers_nothing() {
        let bindings = build_watch_bindings(&config()).unwrap();
        let root = Path::new("/proj");

        let mut batch = Batch::default();
        batch.collect(root, &bindings, &modify_event(&["/proj/README.md"]));
        assert!(batch.is_empty());
    }

    #[test]
    fn burst_of_changes_to_one_path_collapses_to_one_task_entry() {
        let bindings = build_watch_bindings(&config()).unwrap();
        let root = Path::new("/proj");

        let mut batch = Batch::default();
        for _ in 0..5 {
            batch.collect(root, &bindings, &modify_event(&["/proj/src/js/app.js"]));
        }

        assert_eq!(batch.pending.len(), 1);
        let (category, paths) = &batch.pending["build:js"];
        assert_eq!(*category, AssetCategory::Script);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn access_events_are_ignored()  {
        let bindings = build_watch_bindings(&config()).unwrap();
        let root = Path::new("/proj");

        let event = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/proj/src/sass/app.scss"));

        let mut batch = Batch::default();
        batch.collect(root, &bindings, &event);
        assert!(batch.is_empty());
    }
}
