//! Day-over-day snapshot runs

use crate::common::cli::SnapCommand;
use crate::common::{ino, TestTree};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn build(tree: &TestTree, today: &str) -> SnapCommand {
    let mut cmd = SnapCommand::new(&tree.target);
    cmd.args(&["build"])
        .path_arg(&tree.source)
        .path_arg(&tree.target)
        .args(&["--today", today, "--json"]);
    cmd
}

#[test]
fn test_second_run_hardlinks_unchanged_file() -> Result<()> {
    let tree = TestTree::new();
    tree.write("a/file1", &[42u8; 100], 1_700_000_000);

    let first = build(&tree, "202401/01").assert_success()?.json()?;
    assert_eq!(first["files_copied"], 1);
    assert_eq!(first["files_linked"], 0);

    let second = build(&tree, "202401/02").assert_success()?.json()?;
    assert_eq!(second["anchor"], "202401/01");
    assert_eq!(second["files_copied"], 0);
    assert_eq!(second["files_linked"], 1);
    assert_eq!(second["bytes_copied"], 0);

    let day1 = tree.snapshot_path("202401/01", "a/file1");
    let day2 = tree.snapshot_path("202401/02", "a/file1");
    assert_eq!(ino(&day1), ino(&day2));
    assert_ne!(ino(&day1), ino(&tree.source.join("a/file1")));
    assert_eq!(fs::read(&day2)?, vec![42u8; 100]);
    Ok(())
}

#[test]
fn test_modified_file_gets_fresh_copy() -> Result<()> {
    let tree = TestTree::new();
    tree.write("notes.txt", b"monday", 1_700_000_000);
    tree.write("static.txt", b"never changes", 1_700_000_000);
    build(&tree, "202401/01").assert_success()?;

    tree.write("notes.txt", b"tuesday", 1_700_086_400);
    let report = build(&tree, "202401/02").assert_success()?.json()?;
    assert_eq!(report["files_copied"], 1);
    assert_eq!(report["files_linked"], 1);

    let old = tree.snapshot_path("202401/01", "notes.txt");
    let new = tree.snapshot_path("202401/02", "notes.txt");
    assert_ne!(ino(&old), ino(&new));
    assert_eq!(fs::read(&old)?, b"monday");
    assert_eq!(fs::read(&new)?, b"tuesday");
    Ok(())
}

#[test]
fn test_deleted_file_stays_in_old_snapshot_only() -> Result<()> {
    let tree = TestTree::new();
    let doomed = tree.write("doomed.txt", b"bye", 1_700_000_000);
    build(&tree, "202401/01").assert_success()?;

    fs::remove_file(doomed)?;
    build(&tree, "202401/02").assert_success()?;

    assert!(tree.snapshot_path("202401/01", "doomed.txt").is_file());
    assert!(!tree.snapshot_path("202401/02", "doomed.txt").exists());
    Ok(())
}

#[test]
fn test_week_of_runs_shares_one_inode() -> Result<()> {
    let tree = TestTree::new();
    tree.write("big.bin", &vec![7u8; 64 * 1024], 1_700_000_000);

    for day in 1..=7 {
        build(&tree, &format!("202401/{:02}", day)).assert_success()?;
    }

    let first = ino(&tree.snapshot_path("202401/01", "big.bin"));
    for day in 2..=7 {
        let path = tree.snapshot_path(&format!("202401/{:02}", day), "big.bin");
        assert_eq!(ino(&path), first, "day {} not linked", day);
    }
    let nlink = {
        use std::os::unix::fs::MetadataExt;
        fs::metadata(tree.snapshot_path("202401/07", "big.bin"))?.nlink()
    };
    assert_eq!(nlink, 7);
    Ok(())
}

/// Relative paths under `base`, with a flag for directories
fn listing(base: &Path) -> Result<Vec<(PathBuf, bool)>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(base).min_depth(1) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(base)?.to_path_buf();
        paths.push((rel, entry.file_type().is_dir()));
    }
    paths.sort();
    Ok(paths)
}

#[test]
fn test_snapshots_mirror_source_tree() -> Result<()> {
    let tree = TestTree::new();
    tree.write("docs/readme.md", b"read me", 1_700_000_000);
    tree.write("docs/img/logo.png", &[0u8; 256], 1_700_000_000);
    tree.write("src/main.c", b"int main;", 1_700_000_000);
    tree.symlink("latest", "docs");
    fs::create_dir_all(tree.source.join("cache/empty"))?;

    build(&tree, "202401/01").assert_success()?;
    tree.write("src/main.c", b"int main(void);", 1_700_086_400);
    build(&tree, "202401/02").assert_success()?;

    let expected = listing(&tree.source)?;
    for label in ["202401/01", "202401/02"] {
        assert_eq!(listing(&tree.snapshot_path(label, ""))?, expected, "{}", label);
    }

    for (rel, is_dir) in &expected {
        let today = tree.snapshot_path("202401/02", &rel.to_string_lossy());
        let source = tree.source.join(rel);
        if !is_dir && !fs::symlink_metadata(&source)?.file_type().is_symlink() {
            assert_eq!(fs::read(&today)?, fs::read(&source)?, "{}", rel.display());
        }
    }
    Ok(())
}

#[test]
fn test_human_summary_output() -> Result<()> {
    let tree = TestTree::new();
    tree.write("f", b"x", 1_700_000_000);

    let mut cmd = SnapCommand::new(&tree.target);
    cmd.args(&["build"])
        .path_arg(&tree.source)
        .path_arg(&tree.target)
        .args(&["--today", "202401/01"]);
    let result = cmd.assert_success()?;

    assert!(result.contains_stdout("Files copied"));
    assert!(result.contains_stdout("Snapshot complete"));
    Ok(())
}
