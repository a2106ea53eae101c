//! Filesystem mutation primitives
//!
//! Every change docpipe makes to the directory trees goes through a
//! [`FileStore`]. [`FsStore`] performs the changes; [`DryRunStore`] logs
//! what would happen and leaves the filesystem untouched, which is how dry-run
//! mode keeps the full control flow without side effects.
//!
//! # Guarantees
//!
//! - `atomic_write` leaves either the previous file or the complete new
//!   content at the target, and never a leftover temporary file.
//! - `relocate_contents` moves entries one at a time. Each move is atomic on a
//!   single filesystem, the batch is not: a failure partway through is
//!   reported in the [`RelocationReport`] and nothing is rolled back.

pub mod dry_run;
pub mod fs;

pub use dry_run::DryRunStore;
pub use fs::FsStore;

use crate::config::OverwritePolicy;
use crate::domain::Result;
use std::path::{Path, PathBuf};

/// Result of moving the direct entries of one directory into another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationReport {
    /// Entries now in the destination
    pub moved: usize,

    /// Entries left in place because of [`OverwritePolicy::Skip`]
    pub skipped: usize,

    /// Entries that could not be moved, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl RelocationReport {
    /// Whether every entry was handled without error
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Mutating filesystem operations used by the pipeline
pub trait FileStore: Send + Sync {
    /// Whether this store only pretends to mutate
    fn is_dry_run(&self) -> bool;

    /// Create `path` and its parents if missing
    ///
    /// # Errors
    ///
    /// Returns [`DocpipeError::Directory`](crate::domain::DocpipeError::Directory)
    /// if the directory cannot be created.
    fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Write `content` to `path` through a sibling temporary file and a rename
    ///
    /// Parent directories are created first.
    fn atomic_write(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Move every direct entry of `src` into `dst`
    ///
    /// A missing `src` is a valid empty source. `dst` is created if missing.
    ///
    /// # Errors
    ///
    /// Only a `src` that exists but cannot be listed, or a `dst` that cannot
    /// be created, is an error. Per-entry failures land in the report.
    fn relocate_contents(
        &self,
        src: &Path,
        dst: &Path,
        policy: OverwritePolicy,
    ) -> Result<RelocationReport>;

    /// Move the directory `src` to the new path `dst`
    ///
    /// A missing `src` produces an empty `dst`.
    fn move_dir(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Copy `src` to a new sibling named `{src}_{stamp}`
    ///
    /// On a name collision `_1`, `_2`, ... is appended. Returns the snapshot
    /// path, or `None` when `src` does not exist.
    fn snapshot(&self, src: &Path, stamp: &str) -> Result<Option<PathBuf>>;
}
