//! Real filesystem store

use super::{FileStore, RelocationReport};
use crate::config::OverwritePolicy;
use crate::core::timestamp::{sibling_with_suffix, unique_path};
use crate::domain::{DocpipeError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// [`FileStore`] that mutates the filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FsStore {
    /// Create a new store
    pub fn new() -> Self {
        Self
    }
}

impl FileStore for FsStore {
    fn is_dry_run(&self) -> bool {
        false
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| directory_error(path, e))
    }

    fn atomic_write(&self, path: &Path, content: &[u8]) -> Result<()> {
        let file_name = path
            .file_name()
            .ok_or_else(|| DocpipeError::Io(format!("Not a file path: {}", path.display())))?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        self.ensure_dir(parent)?;

        let prefix = format!(".{}.", file_name.to_string_lossy());
        let mut tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| write_error(path, e))?;

        // Dropping `tmp` on any early return deletes the temporary file.
        tmp.write_all(content).map_err(|e| write_error(path, e))?;
        tmp.as_file().sync_all().map_err(|e| write_error(path, e))?;
        tmp.persist(path).map_err(|e| write_error(path, e.error))?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "Atomic write complete");
        Ok(())
    }

    fn relocate_contents(
        &self,
        src: &Path,
        dst: &Path,
        policy: OverwritePolicy,
    ) -> Result<RelocationReport> {
        let mut report = RelocationReport::default();

        let entries = match fs::read_dir(src) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(src = %src.display(), "Nothing to relocate; source missing");
                return Ok(report);
            }
            Err(e) => return Err(directory_error(src, e)),
        };

        self.ensure_dir(dst)?;

        let mut sources = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => sources.push(entry.path()),
                Err(e) => report.failures.push((src.to_path_buf(), e.to_string())),
            }
        }
        sources.sort();

        for from in sources {
            let Some(name) = from.file_name() else {
                continue;
            };
            let to = dst.join(name);

            if exists(&to) {
                match policy {
                    OverwritePolicy::Skip => {
                        tracing::warn!(
                            entry = %from.display(),
                            destination = %to.display(),
                            "Destination exists; leaving entry in place"
                        );
                        report.skipped += 1;
                        continue;
                    }
                    OverwritePolicy::Replace if needs_clearing(&from, &to) => {
                        if let Err(e) = remove_entry(&to) {
                            tracing::warn!(
                                destination = %to.display(),
                                error = %e,
                                "Could not remove existing destination"
                            );
                            report.failures.push((from, e.to_string()));
                            continue;
                        }
                    }
                    // rename(2) replaces a non-directory destination atomically
                    OverwritePolicy::Replace => {}
                }
            }

            match move_entry(&from, &to) {
                Ok(()) => report.moved += 1,
                Err(e) => {
                    tracing::warn!(
                        entry = %from.display(),
                        destination = %to.display(),
                        error = %e,
                        "Failed to move entry"
                    );
                    report.failures.push((from, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    fn move_dir(&self, src: &Path, dst: &Path) -> Result<()> {
        if exists(dst) {
            return Err(directory_error(
                dst,
                io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
            ));
        }

        if !exists(src) {
            tracing::info!(src = %src.display(), "Source directory missing; creating empty {}", dst.display());
            return self.ensure_dir(dst);
        }

        move_entry(src, dst).map_err(|e| directory_error(src, e))
    }

    fn snapshot(&self, src: &Path, stamp: &str) -> Result<Option<PathBuf>> {
        if !src.is_dir() {
            tracing::info!(src = %src.display(), "Nothing to snapshot");
            return Ok(None);
        }

        let candidate = sibling_with_suffix(src, &format!("_{stamp}")).ok_or_else(|| {
            DocpipeError::Directory {
                path: src.to_path_buf(),
                message: "cannot derive a snapshot name".to_string(),
            }
        })?;
        let dst = unique_path(candidate);

        if let Err(e) = copy_tree(src, &dst) {
            // A half-written snapshot is worse than none.
            let _ = fs::remove_dir_all(&dst);
            return Err(directory_error(&dst, e));
        }

        tracing::info!(src = %src.display(), snapshot = %dst.display(), "Snapshot created");
        Ok(Some(dst))
    }
}

fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Rename, falling back to copy and delete across filesystems
fn move_entry(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                from = %from.display(),
                to = %to.display(),
                "Cross-filesystem move detected, using copy fallback"
            );
            if from.is_dir() {
                copy_tree(from, to)?;
            } else {
                fs::copy(from, to)?;
                fs::File::open(to)?.sync_all()?;
            }
            remove_entry(from)
        }
        Err(e) => Err(e),
    }
}

/// Whether `to` must be removed before `from` can be renamed onto it
///
/// Only a file or link replacing a file or link can rely on the rename.
fn needs_clearing(from: &Path, to: &Path) -> bool {
    let is_dir = |p: &Path| p.symlink_metadata().map(|m| m.is_dir()).unwrap_or(false);
    is_dir(from) || is_dir(to)
}

fn remove_entry(path: &Path) -> io::Result<()> {
    let metadata = path.symlink_metadata()?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Recursively copy `src` into the new directory `dst`
fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn directory_error(path: &Path, err: io::Error) -> DocpipeError {
    DocpipeError::Directory {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn write_error(path: &Path, err: io::Error) -> DocpipeError {
    DocpipeError::Io(format!("Failed to write {}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_atomic_write_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("a/b/out.md");

        FsStore::new().atomic_write(&target, b"# hello").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"# hello");
        assert_eq!(names(&tmp.path().join("a/b")), vec!["out.md"]);
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out.md");
        fs::write(&target, "old").unwrap();

        FsStore::new().atomic_write(&target, b"new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(names(tmp.path()), vec!["out.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_failure_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A non-empty directory at the target makes the final rename fail.
        let target = tmp.path().join("out.md");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        let result = FsStore::new().atomic_write(&target, b"content");

        assert!(result.is_err());
        assert!(target.is_dir());
        assert_eq!(names(tmp.path()), vec!["out.md"]);
        assert_eq!(names(&target), vec!["keep"]);
    }

    #[test]
    fn test_relocate_moves_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("staging");
        let dst = tmp.path().join("active");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.pdf"), "a").unwrap();
        fs::write(src.join("nested/b.pdf"), "b").unwrap();

        let report = FsStore::new()
            .relocate_contents(&src, &dst, OverwritePolicy::Replace)
            .unwrap();

        assert_eq!(report.moved, 2);
        assert!(report.is_clean());
        assert!(names(&src).is_empty());
        assert_eq!(names(&dst), vec!["a.pdf", "nested"]);
        assert_eq!(fs::read_to_string(dst.join("nested/b.pdf")).unwrap(), "b");
    }

    #[test]
    fn test_relocate_missing_source_is_empty() {
        let tmp = TempDir::new().unwrap();
        let report = FsStore::new()
            .relocate_contents(
                &tmp.path().join("missing"),
                &tmp.path().join("dst"),
                OverwritePolicy::Replace,
            )
            .unwrap();
        assert_eq!(report, RelocationReport::default());
    }

    #[test]
    fn test_relocate_overwrite_policies() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("a.pdf"), "new").unwrap();
        fs::write(dst.join("a.pdf"), "old").unwrap();

        let store = FsStore::new();
        let skipped = store
            .relocate_contents(&src, &dst, OverwritePolicy::Skip)
            .unwrap();
        assert_eq!((skipped.moved, skipped.skipped), (0, 1));
        assert_eq!(fs::read_to_string(dst.join("a.pdf")).unwrap(), "old");
        assert!(src.join("a.pdf").exists());

        let replaced = store
            .relocate_contents(&src, &dst, OverwritePolicy::Replace)
            .unwrap();
        assert_eq!((replaced.moved, replaced.skipped), (1, 0));
        assert_eq!(fs::read_to_string(dst.join("a.pdf")).unwrap(), "new");
        assert!(!src.join("a.pdf").exists());
    }

    #[test]
    fn test_replace_only_clears_directories() {
        let tmp = TempDir::new().unwrap();
        let file_a = tmp.path().join("a.pdf");
        let file_b = tmp.path().join("b.pdf");
        let dir = tmp.path().join("project");
        fs::write(&file_a, "a").unwrap();
        fs::write(&file_b, "b").unwrap();
        fs::create_dir(&dir).unwrap();

        assert!(!needs_clearing(&file_a, &file_b));
        assert!(needs_clearing(&file_a, &dir));
        assert!(needs_clearing(&dir, &file_a));
    }

    #[test]
    fn test_replace_across_entry_types() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("was_file")).unwrap();
        fs::write(src.join("was_file/inner.pdf"), "inner").unwrap();
        fs::write(src.join("was_dir"), "now a file").unwrap();
        fs::write(src.join("plain.pdf"), "new").unwrap();
        fs::create_dir_all(dst.join("was_dir")).unwrap();
        fs::write(dst.join("was_dir/old.pdf"), "old").unwrap();
        fs::write(dst.join("was_file"), "old").unwrap();
        fs::write(dst.join("plain.pdf"), "old").unwrap();

        let report = FsStore::new()
            .relocate_contents(&src, &dst, OverwritePolicy::Replace)
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.moved, 3);
        assert_eq!(fs::read_to_string(dst.join("plain.pdf")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dst.join("was_dir")).unwrap(), "now a file");
        assert_eq!(
            fs::read_to_string(dst.join("was_file/inner.pdf")).unwrap(),
            "inner"
        );
    }

    #[test]
    fn test_move_dir_and_missing_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("inputs");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.pdf"), "a").unwrap();

        let store = FsStore::new();
        let archive = tmp.path().join("inputs_old_1");
        store.move_dir(&src, &archive).unwrap();
        assert!(!src.exists());
        assert_eq!(names(&archive), vec!["a.pdf"]);

        let empty_archive = tmp.path().join("inputs_old_2");
        store.move_dir(&src, &empty_archive).unwrap();
        assert!(names(&empty_archive).is_empty());

        assert!(store.move_dir(&archive, &empty_archive).is_err());
    }

    #[test]
    fn test_snapshot_copies_and_avoids_collisions() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("outputs");
        fs::create_dir_all(src.join("projectA")).unwrap();
        fs::write(src.join("projectA/doc_from_pdf.md"), "x").unwrap();

        let store = FsStore::new();
        let first = store.snapshot(&src, "20250101_000000_000").unwrap().unwrap();
        let second = store.snapshot(&src, "20250101_000000_000").unwrap().unwrap();

        assert_eq!(first, tmp.path().join("outputs_20250101_000000_000"));
        assert_eq!(second, tmp.path().join("outputs_20250101_000000_000_1"));
        assert!(first.join("projectA/doc_from_pdf.md").is_file());
        assert!(src.join("projectA/doc_from_pdf.md").is_file());

        assert_eq!(store.snapshot(&tmp.path().join("none"), "x").unwrap(), None);
    }
}
