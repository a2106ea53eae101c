//! Integration tests for dry-run mode
//!
//! A dry run walks every pipeline state and produces full statistics, but the
//! directory trees must be exactly as they were before the run.

mod common;

use common::{tree_snapshot, write_file, ScriptedEngine, Tiers};
use docpipe::core::pipeline::{PipelineController, RunState};
use docpipe::core::store::{DryRunStore, FileStore};
use std::path::Path;
use tempfile::TempDir;

fn populate(tiers: &Tiers) {
    write_file(&tiers.active.join("report.pdf"), b"pdf");
    write_file(&tiers.active.join("projectA/doc.docx"), b"docx");
    write_file(&tiers.active.join("notes.md"), b"# md");
    write_file(&tiers.staging.join("next.pdf"), b"next");
    write_file(&tiers.queue.join("later.pdf"), b"later");
    write_file(&tiers.output.join("report_from_pdf.md"), b"previous output");
}

#[tokio::test]
async fn test_dry_run_leaves_tree_identical() {
    let tmp = TempDir::new().unwrap();
    let tiers = Tiers::new(tmp.path());
    populate(&tiers);
    let before = tree_snapshot(tmp.path());

    let engine = ScriptedEngine::default();
    let mut config = tiers.config(&["pdf", "docx", "md"], &["md", "html"]);
    config.application.dry_run = true;
    config.rotation.snapshot_outputs = true;

    let outcome = PipelineController::new(config, &engine).run().await.unwrap();

    assert_eq!(tree_snapshot(tmp.path()), before);

    assert!(outcome.dry_run);
    assert_eq!(outcome.states, RunState::SEQUENCE.to_vec());
    assert_eq!(outcome.stats.total_discovered, 3);
    // 3 files x 2 formats, minus notes.md -> md
    assert_eq!(outcome.stats.succeeded, 5);
    assert_eq!(outcome.stats.skipped, 1);
    assert_eq!(outcome.stats.bytes_processed, 0);
    assert!(outcome.report_path.is_none());
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn test_dry_run_still_plans_rotation() {
    let tmp = TempDir::new().unwrap();
    let tiers = Tiers::new(tmp.path());
    populate(&tiers);

    let engine = ScriptedEngine::default();
    let config = tiers.config(&["pdf"], &["md"]);
    let outcome = PipelineController::new(config, &engine)
        .execute(&DryRunStore::new())
        .await
        .unwrap();

    let rotation = outcome.rotation.expect("rotation planned");
    assert!(rotation.is_consistent());
    assert_eq!(rotation.staging_moved, 1);
    assert_eq!(rotation.queue_moved, 1);
    let archive_name = rotation
        .archive_path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert!(archive_name.starts_with("active_old_"));
    assert!(!rotation.archive_path.exists());
}

#[tokio::test]
async fn test_dry_run_on_missing_tiers_creates_nothing() {
    let tmp = TempDir::new().unwrap();
    let tiers = Tiers::new(tmp.path());

    let engine = ScriptedEngine::default();
    let outcome = PipelineController::new(tiers.config(&["pdf"], &["md"]), &engine)
        .execute(&DryRunStore::new())
        .await
        .unwrap();

    assert_eq!(outcome.stats.total_discovered, 0);
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn test_dry_run_store_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = DryRunStore::new();
    let target = tmp.path().join("out/a.md");

    assert!(store.is_dry_run());
    store.atomic_write(&target, b"content").unwrap();
    store.ensure_dir(&tmp.path().join("new_dir")).unwrap();

    assert!(!target.exists());
    assert!(!Path::new(&tmp.path().join("new_dir")).exists());
}
