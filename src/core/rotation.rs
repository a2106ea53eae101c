//! Three-tier input rotation
//!
//! After a run's conversions complete the tiers shift by one:
//!
//! 1. `active` is moved to a fresh `{active}_old_{timestamp}` archive
//! 2. `active` is recreated empty
//! 3. the contents of `staging` move into `active`
//! 4. the contents of `queue` move into `staging`
//!
//! Each step drains the destination of the next, so the order is fixed. A
//! failed step 1 aborts the rotation with no tier advanced. A failure in steps
//! 2 to 4 stops the sequence, keeps whatever already happened, and is
//! reported on the [`RotationOutcome`] for the operator to inspect.

use crate::config::OverwritePolicy;
use crate::core::store::FileStore;
use crate::core::timestamp::{now_stamp, sibling_with_suffix, unique_path};
use crate::domain::{DocpipeError, Result};
use std::path::{Path, PathBuf};

/// What a rotation did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationOutcome {
    /// Archive holding the previous active tier
    pub archive_path: PathBuf,

    /// Entries promoted from staging to active
    pub staging_moved: usize,

    /// Entries promoted from queue to staging
    pub queue_moved: usize,

    /// Problems in steps 2 to 4; empty when the tiers are consistent
    pub issues: Vec<String>,
}

impl RotationOutcome {
    /// Whether every step completed
    pub fn is_consistent(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Runs the rotation sequence through a [`FileStore`]
pub struct RotationEngine<'a> {
    store: &'a dyn FileStore,
    overwrite: OverwritePolicy,
}

impl<'a> RotationEngine<'a> {
    /// Create an engine; `overwrite` applies to both promotions
    pub fn new(store: &'a dyn FileStore, overwrite: OverwritePolicy) -> Self {
        Self { store, overwrite }
    }

    /// Rotate the tiers using the current time for the archive name
    ///
    /// # Errors
    ///
    /// Returns [`DocpipeError::Rotation`] if the active tier cannot be
    /// archived. No tier is advanced in that case.
    pub fn rotate(&self, active: &Path, queue: &Path, staging: &Path) -> Result<RotationOutcome> {
        self.rotate_with_stamp(active, queue, staging, &now_stamp())
    }

    /// Rotate the tiers with an explicit archive timestamp
    pub fn rotate_with_stamp(
        &self,
        active: &Path,
        queue: &Path,
        staging: &Path,
        stamp: &str,
    ) -> Result<RotationOutcome> {
        let archive = sibling_with_suffix(active, &format!("_old_{stamp}"))
            .map(unique_path)
            .ok_or_else(|| {
                DocpipeError::Rotation(format!(
                    "cannot derive an archive name from {}",
                    active.display()
                ))
            })?;

        self.store.move_dir(active, &archive).map_err(|e| {
            tracing::error!(
                active = %active.display(),
                archive = %archive.display(),
                error = %e,
                "Failed to archive active tier; rotation aborted"
            );
            DocpipeError::Rotation(format!(
                "failed to archive {} to {}: {}",
                active.display(),
                archive.display(),
                e
            ))
        })?;
        tracing::info!("Archived: {} -> {}", active.display(), archive.display());

        let mut outcome = RotationOutcome {
            archive_path: archive,
            ..RotationOutcome::default()
        };

        if let Err(e) = self.store.ensure_dir(active) {
            record_issue(&mut outcome, format!("failed to recreate {}: {e}", active.display()));
            return Ok(outcome);
        }
        tracing::info!("Created empty: {}", active.display());

        match self.promote(staging, active) {
            Ok(moved) => outcome.staging_moved = moved,
            Err(issue) => {
                record_issue(&mut outcome, issue);
                return Ok(outcome);
            }
        }

        match self.promote(queue, staging) {
            Ok(moved) => outcome.queue_moved = moved,
            Err(issue) => record_issue(&mut outcome, issue),
        }

        Ok(outcome)
    }

    /// Move `src` contents into `dst` and make sure `src` still exists
    fn promote(&self, src: &Path, dst: &Path) -> std::result::Result<usize, String> {
        let report = self
            .store
            .relocate_contents(src, dst, self.overwrite)
            .map_err(|e| format!("failed to move {} -> {}: {e}", src.display(), dst.display()))?;

        if report.moved > 0 {
            tracing::info!("Moved {} items: {} -> {}", report.moved, src.display(), dst.display());
        } else {
            tracing::info!("No items in {}", src.display());
        }

        if !report.is_clean() {
            let detail: Vec<String> = report
                .failures
                .iter()
                .map(|(path, reason)| format!("{}: {reason}", path.display()))
                .collect();
            return Err(format!(
                "{} of {} entries not moved from {} -> {} ({})",
                report.failures.len(),
                report.failures.len() + report.moved,
                src.display(),
                dst.display(),
                detail.join("; ")
            ));
        }

        if report.skipped > 0 {
            return Err(format!(
                "{} entries left in {} because they already exist in {}",
                report.skipped,
                src.display(),
                dst.display()
            ));
        }

        self.store
            .ensure_dir(src)
            .map_err(|e| format!("failed to recreate {}: {e}", src.display()))?;

        Ok(report.moved)
    }
}

fn record_issue(outcome: &mut RotationOutcome, issue: String) {
    tracing::error!(issue = %issue, "Rotation left tiers inconsistent");
    outcome.issues.push(issue);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{FsStore, RelocationReport};
    use std::fs;
    use tempfile::TempDir;

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    struct Tiers {
        _tmp: TempDir,
        active: PathBuf,
        staging: PathBuf,
        queue: PathBuf,
    }

    fn tiers(active: &[&str], staging: &[&str], queue: &[&str]) -> Tiers {
        let tmp = TempDir::new().unwrap();
        let make = |name: &str, files: &[&str]| {
            let dir = tmp.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            for file in files {
                fs::write(dir.join(file), file).unwrap();
            }
            dir
        };
        Tiers {
            active: make("inputs", active),
            staging: make("inputs_staging", staging),
            queue: make("inputs_queue", queue),
            _tmp: tmp,
        }
    }

    /// Delegates to [`FsStore`] but fails relocations out of one directory
    struct FailingStore {
        fail_src: Option<PathBuf>,
        fail_archive: bool,
    }

    impl FileStore for FailingStore {
        fn is_dry_run(&self) -> bool {
            false
        }
        fn ensure_dir(&self, path: &Path) -> Result<()> {
            FsStore.ensure_dir(path)
        }
        fn atomic_write(&self, path: &Path, content: &[u8]) -> Result<()> {
            FsStore.atomic_write(path, content)
        }
        fn relocate_contents(
            &self,
            src: &Path,
            dst: &Path,
            policy: OverwritePolicy,
        ) -> Result<RelocationReport> {
            if self.fail_src.as_deref() == Some(src) {
                return Err(DocpipeError::Io("disk on fire".to_string()));
            }
            FsStore.relocate_contents(src, dst, policy)
        }
        fn move_dir(&self, src: &Path, dst: &Path) -> Result<()> {
            if self.fail_archive {
                return Err(DocpipeError::Io("permission denied".to_string()));
            }
            FsStore.move_dir(src, dst)
        }
        fn snapshot(&self, src: &Path, stamp: &str) -> Result<Option<PathBuf>> {
            FsStore.snapshot(src, stamp)
        }
    }

    #[test]
    fn test_rotation_shifts_every_tier() {
        let t = tiers(&["A.pdf"], &["B.pdf"], &["C.pdf"]);
        let store = FsStore::new();

        let outcome = RotationEngine::new(&store, OverwritePolicy::Replace)
            .rotate_with_stamp(&t.active, &t.queue, &t.staging, "20250101_000000_000")
            .unwrap();

        assert!(outcome.is_consistent());
        assert_eq!(names(&t.active), vec!["B.pdf"]);
        assert_eq!(names(&t.staging), vec!["C.pdf"]);
        assert!(names(&t.queue).is_empty());
        assert_eq!(names(&outcome.archive_path), vec!["A.pdf"]);
        assert_eq!(
            outcome.archive_path.file_name().unwrap(),
            "inputs_old_20250101_000000_000"
        );
        assert_eq!((outcome.staging_moved, outcome.queue_moved), (1, 1));
    }

    #[test]
    fn test_archive_name_collision_gets_suffix() {
        let t = tiers(&["A.pdf"], &[], &[]);
        let store = FsStore::new();
        let engine = RotationEngine::new(&store, OverwritePolicy::Replace);

        let first = engine
            .rotate_with_stamp(&t.active, &t.queue, &t.staging, "same")
            .unwrap();
        let second = engine
            .rotate_with_stamp(&t.active, &t.queue, &t.staging, "same")
            .unwrap();

        assert_eq!(names(&first.archive_path), vec!["A.pdf"]);
        assert!(second.archive_path.to_string_lossy().ends_with("inputs_old_same_1"));
        assert!(names(&second.archive_path).is_empty());
    }

    #[test]
    fn test_missing_active_still_archives_and_recreates() {
        let t = tiers(&[], &["B.pdf"], &[]);
        fs::remove_dir_all(&t.active).unwrap();
        let store = FsStore::new();

        let outcome = RotationEngine::new(&store, OverwritePolicy::Replace)
            .rotate(&t.active, &t.queue, &t.staging)
            .unwrap();

        assert!(outcome.archive_path.is_dir());
        assert_eq!(names(&t.active), vec!["B.pdf"]);
    }

    #[test]
    fn test_archive_failure_advances_nothing() {
        let t = tiers(&["A.pdf"], &["B.pdf"], &["C.pdf"]);
        let store = FailingStore {
            fail_src: None,
            fail_archive: true,
        };

        let err = RotationEngine::new(&store, OverwritePolicy::Replace)
            .rotate(&t.active, &t.queue, &t.staging)
            .unwrap_err();

        assert!(matches!(err, DocpipeError::Rotation(_)));
        assert_eq!(names(&t.active), vec!["A.pdf"]);
        assert_eq!(names(&t.staging), vec!["B.pdf"]);
        assert_eq!(names(&t.queue), vec!["C.pdf"]);
    }

    #[test]
    fn test_staging_failure_keeps_queue_in_place() {
        let t = tiers(&["A.pdf"], &["B.pdf"], &["C.pdf"]);
        let store = FailingStore {
            fail_src: Some(t.staging.clone()),
            fail_archive: false,
        };

        let outcome = RotationEngine::new(&store, OverwritePolicy::Replace)
            .rotate(&t.active, &t.queue, &t.staging)
            .unwrap();

        assert!(!outcome.is_consistent());
        assert!(outcome.issues[0].contains("disk on fire"));
        assert_eq!(names(&outcome.archive_path), vec!["A.pdf"]);
        assert!(names(&t.active).is_empty());
        assert_eq!(names(&t.staging), vec!["B.pdf"]);
        assert_eq!(names(&t.queue), vec!["C.pdf"]);
    }

    #[test]
    fn test_queue_failure_is_recoverable() {
        let t = tiers(&["A.pdf"], &["B.pdf"], &["C.pdf"]);
        let store = FailingStore {
            fail_src: Some(t.queue.clone()),
            fail_archive: false,
        };

        let outcome = RotationEngine::new(&store, OverwritePolicy::Replace)
            .rotate(&t.active, &t.queue, &t.staging)
            .unwrap();

        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.staging_moved, 1);
        assert_eq!(names(&t.active), vec!["B.pdf"]);
        assert_eq!(names(&t.queue), vec!["C.pdf"]);
    }
}
