//! Run timestamps and collision-free sibling names

use std::path::{Path, PathBuf};

/// Format of every timestamp docpipe puts in a path
pub const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Current local time as `YYYYMMDD_HHMMSS_mmm`
pub fn now_stamp() -> String {
    chrono::Local::now().format(STAMP_FORMAT).to_string()
}

/// First free path among `candidate`, `candidate_1`, `candidate_2`, ...
///
/// A dangling symlink counts as taken.
pub fn unique_path(candidate: PathBuf) -> PathBuf {
    if !is_taken(&candidate) {
        return candidate;
    }

    let base = candidate.as_os_str().to_os_string();
    (1u32..)
        .map(|n| {
            let mut name = base.clone();
            name.push(format!("_{n}"));
            PathBuf::from(name)
        })
        .find(|p| !is_taken(p))
        .unwrap_or(candidate)
}

/// `dir` with `suffix` appended to its final component
///
/// Returns `None` for paths without a final component such as `/` or `..`.
pub fn sibling_with_suffix(dir: &Path, suffix: &str) -> Option<PathBuf> {
    let name = dir.file_name()?;
    let mut sibling = name.to_os_string();
    sibling.push(suffix);
    Some(dir.with_file_name(sibling))
}

fn is_taken(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_shape() {
        let stamp = now_stamp();
        assert_eq!(stamp.len(), "20250101_120000_123".len());
        let parts: Vec<&str> = stamp.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 3);
        assert!(stamp.chars().all(|c| c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn test_unique_path_increments_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("inputs_old_x");

        assert_eq!(unique_path(base.clone()), base);

        std::fs::create_dir(&base).unwrap();
        let first = unique_path(base.clone());
        assert_eq!(first, dir.path().join("inputs_old_x_1"));

        std::fs::create_dir(&first).unwrap();
        assert_eq!(unique_path(base), dir.path().join("inputs_old_x_2"));
    }

    #[test]
    fn test_sibling_with_suffix() {
        assert_eq!(
            sibling_with_suffix(Path::new("/srv/inputs"), "_old_1"),
            Some(PathBuf::from("/srv/inputs_old_1"))
        );
        assert_eq!(
            sibling_with_suffix(Path::new("./outputs"), "_2025"),
            Some(PathBuf::from("./outputs_2025"))
        );
        assert_eq!(sibling_with_suffix(Path::new("/"), "_x"), None);
    }
}
