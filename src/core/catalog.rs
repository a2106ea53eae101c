//! Input discovery
//!
//! Walks the active tier and produces the sorted list of files to convert.
//! Both the root and every candidate are canonicalised before a relative path
//! is computed; a candidate that does not land under the canonical root is a
//! [`DocpipeError::PathMismatch`], never a best guess.

use crate::domain::{DocpipeError, InputFileRef, Result};
use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Recursively list files under `root` whose extension is in `allowed`
///
/// `allowed` holds lower-cased extensions without the dot. Symbolic links are
/// followed. The result is sorted by relative path, and a file reached through
/// several links is listed once.
///
/// # Errors
///
/// Returns an error if `root` exists but cannot be resolved, or if a
/// discovered file does not resolve to a descendant of `root` (for example a
/// symlink pointing outside the tree).
///
/// # Examples
///
/// ```no_run
/// use docpipe::core::catalog::discover;
/// use std::collections::BTreeSet;
/// use std::path::Path;
///
/// let allowed: BTreeSet<String> = ["pdf".to_string()].into();
/// for file in discover(Path::new("./inputs"), &allowed)? {
///     println!("{}", file.relative_path);
/// }
/// # Ok::<(), docpipe::domain::DocpipeError>(())
/// ```
pub fn discover(root: &Path, allowed: &BTreeSet<String>) -> Result<Vec<InputFileRef>> {
    let canonical_root = match root.canonicalize() {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(root = %root.display(), "Input directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(DocpipeError::Directory {
                path: root.to_path_buf(),
                message: e.to_string(),
            })
        }
    };

    let mut files = Vec::new();

    for entry in WalkDir::new(&canonical_root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_allowed_extension(entry.path(), allowed) {
            continue;
        }

        let resolved = match entry.path().canonicalize() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "Cannot resolve file");
                continue;
            }
        };

        // A link named `*.pdf` may point at any file type
        if !has_allowed_extension(&resolved, allowed) {
            tracing::debug!(
                path = %entry.path().display(),
                target = %resolved.display(),
                "Skipping link whose target has a disallowed extension"
            );
            continue;
        }

        files.push(InputFileRef::resolve(&canonical_root, &resolved)?);
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    // Links back into the tree resolve to a file already listed.
    files.dedup_by(|a, b| a.absolute_path == b.absolute_path);

    tracing::debug!(root = %canonical_root.display(), count = files.len(), "Discovery complete");
    Ok(files)
}

fn has_allowed_extension(path: &Path, allowed: &BTreeSet<String>) -> bool {
    path.extension()
        .map(|ext| allowed.contains(&ext.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or(false)
}
