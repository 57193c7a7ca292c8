use std::error::Error;
use std::path::Path;

use sitepipe::freshness::ChangeFilter;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn identical_bytes_pass_then_suppress() -> TestResult {
    let dir = tempfile::tempdir()?;
    let filter = ChangeFilter::load(dir.path().join("ledger"))?;

    let out = Path::new("build/index.html");
    assert!(filter.should_write(out, b"<html></html>"));
    assert!(!filter.should_write(out, b"<html></html>"));
    Ok(())
}

#[test]
fn differing_bytes_always_pass() -> TestResult {
    let dir = tempfile::tempdir()?;
    let filter = ChangeFilter::load(dir.path().join("ledger"))?;

    let out = Path::new("build/css/app.css");
    assert!(filter.should_write(out, b"body { color: red }"));
    assert!(filter.should_write(out, b"body { color: blue }"));
    assert!(filter.should_write(out, b"body { color: red }"));
    Ok(())
}

#[test]
fn decisions_are_order_independent_across_paths() -> TestResult {
    let dir = tempfile::tempdir()?;
    let filter = ChangeFilter::load(dir.path().join("ledger"))?;

    // Interleaved writes to different paths must not disturb each other.
    assert!(filter.should_write(Path::new("a.html"), b"one"));
    assert!(filter.should_write(Path::new("b.html"), b"one"));
    assert!(!filter.should_write(Path::new("a.html"), b"one"));
    assert!(!filter.should_write(Path::new("b.html"), b"one"));
    Ok(())
}

#[test]
fn ledger_survives_a_process_restart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let ledger = dir.path().join(".sitepipe/ledger");

    {
        let filter = ChangeFilter::load(&ledger)?;
        assert!(filter.should_write(Path::new("build/index.html"), b"persisted"));
        filter.persist()?;
    }

    let filter = ChangeFilter::load(&ledger)?;
    assert!(
        !filter.should_write(Path::new("build/index.html"), b"persisted"),
        "digest recorded before restart must still suppress the write"
    );
    assert!(filter.should_write(Path::new("build/index.html"), b"changed"));
    Ok(())
}

#[test]
fn newline_paths_do_not_corrupt_the_ledger() -> TestResult {
    let dir = tempfile::tempdir()?;
    let ledger = dir.path().join("ledger");

    {
        let filter = ChangeFilter::load(&ledger)?;
        assert!(filter.should_write(Path::new("weird\nname.html"), b"bytes"));
        assert!(filter.should_write(Path::new("plain.html"), b"bytes"));
        filter.persist()?;
    }

    // Representable entries survive; the unrepresentable path is simply not
    // recorded (rewritten next run) instead of breaking neighbouring lines.
    let filter = ChangeFilter::load(&ledger)?;
    assert!(!filter.should_write(Path::new("plain.html"), b"bytes"));
    assert!(filter.should_write(Path::new("weird\nname.html"), b"bytes"));
    Ok(())
}

#[test]
fn clear_forgets_all_digests() -> TestResult {
    let dir = tempfile::tempdir()?;
    let filter = ChangeFilter::load(dir.path().join("ledger"))?;

    assert!(filter.should_write(Path::new("x"), b"data"));
    filter.clear();
    assert!(filter.should_write(Path::new("x"), b"data"));
    Ok(())
}
