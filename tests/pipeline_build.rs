use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use sitepipe::config::model::ConfigFile;
use sitepipe::freshness::{ChangeFilter, LEDGER_PATH};
use sitepipe::task::context::TaskContext;
use sitepipe::task::orchestrator::Orchestrator;
use sitepipe::task::registry::TaskRegistry;
use sitepipe::tasks::register_builtin;

type TestResult = Result<(), Box<dyn Error>>;

const CONFIG: &str = r#"
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
watch = "src/sass/**/*"
dest = "build/css/"

[paths.image]
src = "src/img/**/*"
watch = "src/img/**/*"
dest = "build/img/"

[paths.font]
src = "src/fonts/**/*"
watch = "src/fonts/**/*"
dest = "build/fonts/"
"#;

/// Lay out a small source tree: one page, one font. No transforms are
/// configured, so sources copy through (markup is renamed to `.html`).
fn scaffold(root: &Path) -> TestResult {
    fs::create_dir_all(root.join("src/pug/pages"))?;
    fs::write(root.join("src/pug/pages/index.pug"), "<html><body>hi</body></html>")?;
    fs::create_dir_all(root.join("src/fonts"))?;
    fs::write(root.join("src/fonts/site.woff2"), b"\x00fontbytes")?;
    Ok(())
}

fn context(root: &Path) -> Result<Arc<TaskContext>, Box<dyn Error>> {
    let config: ConfigFile = toml::from_str(CONFIG)?;
    let filter = ChangeFilter::load(root.join(LEDGER_PATH))?;
    Ok(Arc::new(TaskContext::new(
        root.to_path_buf(),
        config,
        filter,
    )))
}

fn orchestrator() -> Result<Orchestrator, Box<dyn Error>> {
    let mut registry = TaskRegistry::new();
    register_builtin(&mut registry)?;
    registry.validate()?;
    Ok(Orchestrator::new(registry))
}

#[tokio::test]
async fn build_html_produces_renamed_output() -> TestResult {
    let dir = tempfile::tempdir()?;
    scaffold(dir.path())?;

    orchestrator()?
        .run("build:html", context(dir.path())?)
        .await?;

    let out = dir.path().join("build/index.html");
    assert!(out.is_file(), "expected {out:?}");
    assert_eq!(fs::read_to_string(&out)?, "<html><body>hi</body></html>");
    Ok(())
}

#[tokio::test]
async fn unchanged_sources_do_not_rewrite_outputs() -> TestResult {
    let dir = tempfile::tempdir()?;
    scaffold(dir.path())?;
    let out = dir.path().join("build/index.html");

    let orchestrator = orchestrator()?;
    orchestrator.run("build:html", context(dir.path())?).await?;
    assert!(out.is_file());

    // Plant a sentinel: if the second run skips the write (as the recorded
    // digest says it should), the sentinel survives.
    fs::write(&out, "sentinel")?;
    orchestrator.run("build:html", context(dir.path())?).await?;
    assert_eq!(fs::read_to_string(&out)?, "sentinel");

    // A source edit invalidates the digest and the output is rewritten.
    fs::write(
        dir.path().join("src/pug/pages/index.pug"),
        "<html><body>v2</body></html>",
    )?;
    orchestrator.run("build:html", context(dir.path())?).await?;
    assert_eq!(fs::read_to_string(&out)?, "<html><body>v2</body></html>");
    Ok(())
}

#[tokio::test]
async fn full_build_covers_all_categories() -> TestResult {
    let dir = tempfile::tempdir()?;
    scaffold(dir.path())?;

    orchestrator()?.run("build", context(dir.path())?).await?;

    assert!(dir.path().join("build/index.html").is_file());
    assert!(dir.path().join("build/fonts/site.woff2").is_file());
    Ok(())
}

#[tokio::test]
async fn clean_then_build_reproduces_a_fresh_build() -> TestResult {
    let dir = tempfile::tempdir()?;
    scaffold(dir.path())?;

    let orchestrator = orchestrator()?;
    let ctx = context(dir.path())?;
    orchestrator.run("build", Arc::clone(&ctx)).await?;
    let first = fs::read(dir.path().join("build/index.html"))?;

    orchestrator.run("clean", Arc::clone(&ctx)).await?;
    assert!(!dir.path().join("build").exists(), "clean removes outputs");
    assert!(
        !dir.path().join(LEDGER_PATH).exists(),
        "clean removes the freshness ledger"
    );

    orchestrator.run("build", ctx).await?;
    let second = fs::read(dir.path().join("build/index.html"))?;
    assert_eq!(first, second, "rebuild after clean is byte-identical");
    Ok(())
}

#[tokio::test]
async fn todo_task_reports_annotations_in_watched_sources() -> TestResult {
    let dir = tempfile::tempdir()?;
    scaffold(dir.path())?;
    fs::create_dir_all(dir.path().join("src/js"))?;
    fs::write(
        dir.path().join("src/js/app.js"),
        "var nav;\n// TODO: hook up the mobile nav\n",
    )?;

    let ctx = context(dir.path())?;
    let hits = sitepipe::pipeline::notes::scan_tags(&ctx)?;
    assert_eq!(hits.len(), 1, "got: {hits:?}");
    assert_eq!(hits[0].path, "src/js/app.js");
    assert_eq!(hits[0].line, 2);
    assert_eq!(hits[0].tag, "TODO");
    assert_eq!(hits[0].text, "hook up the mobile nav");

    // The registered task runs the same scan and never fails on hits.
    orchestrator()?.run("todo", ctx).await?;
    Ok(())
}

#[tokio::test]
async fn clean_on_a_fresh_tree_succeeds() -> TestResult {
    let dir = tempfile::tempdir()?;
    scaffold(dir.path())?;
    orchestrator()?.run("clean", context(dir.path())?).await?;
    Ok(())
}
