//! Store that logs instead of mutating

use super::{FileStore, RelocationReport};
use crate::config::OverwritePolicy;
use crate::core::timestamp::{sibling_with_suffix, unique_path};
use crate::domain::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// [`FileStore`] for dry runs
///
/// Reads are real so counts and names match what a production run would do;
/// writes are replaced by `[DRY RUN]` log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunStore;

impl DryRunStore {
    /// Create a new dry-run store
    pub fn new() -> Self {
        Self
    }
}

impl FileStore for DryRunStore {
    fn is_dry_run(&self) -> bool {
        true
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            tracing::info!("[DRY RUN] Would create directory: {}", path.display());
        }
        Ok(())
    }

    fn atomic_write(&self, path: &Path, content: &[u8]) -> Result<()> {
        tracing::info!(
            bytes = content.len(),
            "[DRY RUN] Would write: {}",
            path.display()
        );
        Ok(())
    }

    fn relocate_contents(
        &self,
        src: &Path,
        dst: &Path,
        policy: OverwritePolicy,
    ) -> Result<RelocationReport> {
        let mut report = RelocationReport::default();
        let Ok(entries) = fs::read_dir(src) else {
            return Ok(report);
        };

        for entry in entries.flatten() {
            let target = dst.join(entry.file_name());
            if policy == OverwritePolicy::Skip && target.symlink_metadata().is_ok() {
                report.skipped += 1;
            } else {
                report.moved += 1;
            }
        }

        tracing::info!(
            "[DRY RUN] Would move {} items: {} -> {}",
            report.moved,
            src.display(),
            dst.display()
        );
        Ok(report)
    }

    fn move_dir(&self, src: &Path, dst: &Path) -> Result<()> {
        tracing::info!("[DRY RUN] Would rotate: {} -> {}", src.display(), dst.display());
        Ok(())
    }

    fn snapshot(&self, src: &Path, stamp: &str) -> Result<Option<PathBuf>> {
        if !src.is_dir() {
            return Ok(None);
        }
        let target = sibling_with_suffix(src, &format!("_{stamp}")).map(unique_path);
        if let Some(target) = &target {
            tracing::info!(
                "[DRY RUN] Would snapshot: {} -> {}",
                src.display(),
                target.display()
            );
        }
        Ok(target)
    }
}
