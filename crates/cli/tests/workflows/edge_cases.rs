//! Unusual entries and fatal preconditions

use crate::common::cli::SnapCommand;
use crate::common::TestTree;
use anyhow::Result;
use std::fs;
use std::path::PathBuf;

fn build_json(tree: &TestTree, today: &str) -> Result<serde_json::Value> {
    let mut cmd = SnapCommand::new(&tree.target);
    cmd.args(&["build"])
        .path_arg(&tree.source)
        .path_arg(&tree.target)
        .args(&["--today", today, "--json"]);
    cmd.assert_success()?.json()
}

#[test]
fn test_fifo_warns_and_siblings_survive() -> Result<()> {
    let tree = TestTree::new();
    tree.write("a.txt", b"a", 1_700_000_000);
    tree.write("nested/b.txt", b"b", 1_700_000_000);
    tree.fifo("queue");

    let mut cmd = SnapCommand::new(&tree.target);
    cmd.args(&["build"])
        .path_arg(&tree.source)
        .path_arg(&tree.target)
        .args(&["--today", "202401/01", "--json"]);
    let result = cmd.assert_success()?;

    // Logged on stderr...
    assert!(result.contains_stderr("queue"));
    assert!(result.contains_stderr("named pipe"));

    // ...and recorded in the report
    let report = result.json()?;
    let warnings = report["warnings"].as_array().expect("warnings array");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["path"], "queue");
    assert_eq!(warnings[0]["kind"], "unsupported");

    assert!(fs::symlink_metadata(tree.snapshot_path("202401/01", "queue")).is_err());
    assert!(tree.snapshot_path("202401/01", "a.txt").is_file());
    assert!(tree.snapshot_path("202401/01", "nested/b.txt").is_file());
    Ok(())
}

#[test]
fn test_symlinks_keep_their_target_text() -> Result<()> {
    let tree = TestTree::new();
    tree.write("real/data.txt", b"d", 1_700_000_000);
    tree.symlink("to_dir", "real");
    tree.symlink("absolute", "/definitely/not/here");

    let report = build_json(&tree, "202401/01")?;
    assert_eq!(report["symlinks_created"], 2);

    let to_dir = tree.snapshot_path("202401/01", "to_dir");
    assert!(fs::symlink_metadata(&to_dir)?.file_type().is_symlink());
    assert_eq!(fs::read_link(&to_dir)?, PathBuf::from("real"));
    assert_eq!(
        fs::read_link(tree.snapshot_path("202401/01", "absolute"))?,
        PathBuf::from("/definitely/not/here")
    );
    Ok(())
}

#[test]
fn test_empty_source_builds_empty_snapshot() -> Result<()> {
    let tree = TestTree::new();

    let report = build_json(&tree, "202401/01")?;
    assert_eq!(report["files_copied"], 0);

    let root = tree.snapshot_path("202401/01", "");
    assert!(root.is_dir());
    assert_eq!(fs::read_dir(&root)?.count(), 0);
    Ok(())
}

#[test]
fn test_malformed_today_is_fatal() -> Result<()> {
    let tree = TestTree::new();
    tree.write("f", b"f", 1_700_000_000);

    let mut cmd = SnapCommand::new(&tree.target);
    cmd.args(&["build"])
        .path_arg(&tree.source)
        .path_arg(&tree.target)
        .args(&["--today", "2024-01-01"]);
    let result = cmd.assert_failure()?;

    assert!(result.contains_stderr("Invalid --today label"));
    // Nothing was written
    assert_eq!(fs::read_dir(&tree.target)?.count(), 0);
    Ok(())
}

#[test]
fn test_malformed_anchor_is_fatal() -> Result<()> {
    let tree = TestTree::new();

    let mut cmd = SnapCommand::new(&tree.target);
    cmd.args(&["build"])
        .path_arg(&tree.source)
        .path_arg(&tree.target)
        .args(&["--today", "202401/02", "--anchor", "202401/1"]);
    let result = cmd.assert_failure()?;

    assert!(result.contains_stderr("Invalid --anchor label"));
    assert_eq!(fs::read_dir(&tree.target)?.count(), 0);
    Ok(())
}

#[test]
fn test_target_equal_to_source_is_fatal() -> Result<()> {
    let tree = TestTree::new();

    let mut cmd = SnapCommand::new(&tree.source);
    cmd.args(&["build"])
        .path_arg(&tree.source)
        .path_arg(&tree.source)
        .args(&["--today", "202401/01"]);
    let result = cmd.assert_failure()?;

    assert!(result.contains_stderr("same directory"));
    Ok(())
}

#[test]
fn test_missing_source_is_fatal() -> Result<()> {
    let tree = TestTree::new();

    let mut cmd = SnapCommand::new(&tree.target);
    cmd.args(&["build"])
        .path_arg(&tree.source.join("nope"))
        .path_arg(&tree.target)
        .args(&["--today", "202401/01"]);
    let result = cmd.assert_failure()?;

    assert!(result.contains_stderr("does not exist"));
    Ok(())
}

#[test]
fn test_log_file_receives_warnings() -> Result<()> {
    let tree = TestTree::new();
    tree.fifo("pipe");
    let log = tree.target.join("..").join("logs").join("daysnap.log");

    let mut cmd = SnapCommand::new(&tree.target);
    cmd.args(&["build"])
        .path_arg(&tree.source)
        .path_arg(&tree.target)
        .args(&["--today", "202401/01", "--log-file"])
        .path_arg(&log);
    let result = cmd.assert_success()?;

    assert!(!result.contains_stderr("named pipe"));
    let logged = fs::read_to_string(&log)?;
    assert!(logged.contains("pipe"));
    assert!(logged.contains("named pipe"));
    Ok(())
}
