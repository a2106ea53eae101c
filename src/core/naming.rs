//! Output naming
//!
//! Output names carry the source format so that `report.pdf` and
//! `report.docx` converted to the same target never collide:
//! `report_from_pdf.md` and `report_from_docx.md`.

use crate::domain::{ConversionTask, InputFileRef};
use std::path::{Path, PathBuf};

/// `{stem}_from_{input_ext}.{output_ext}`
///
/// # Examples
///
/// ```
/// use docpipe::core::naming::resolve_output_name;
///
/// assert_eq!(resolve_output_name("report", "pdf", "md"), "report_from_pdf.md");
/// ```
pub fn resolve_output_name(stem: &str, input_ext: &str, output_ext: &str) -> String {
    format!("{stem}_from_{input_ext}.{output_ext}")
}

/// Place `file_name` under `output_root`, mirroring the input's directory
///
/// `relative_dir` is the `/`-separated directory portion of the input's
/// relative path. Missing directories are created by the store when the
/// output is written.
pub fn resolve_output_path(
    relative_dir: Option<&str>,
    output_root: &Path,
    file_name: &str,
) -> PathBuf {
    let mut path = output_root.to_path_buf();
    if let Some(dir) = relative_dir {
        path.extend(dir.split('/').filter(|seg| !seg.is_empty()));
    }
    path.push(file_name);
    path
}

/// Build the task converting `input` to `output_ext`
///
/// Returns `None` for a same-type pair; those are skipped, never attempted.
pub fn plan_task<'a>(
    input: &'a InputFileRef,
    output_ext: &str,
    output_root: &Path,
) -> Option<ConversionTask<'a>> {
    let output_ext = output_ext.to_ascii_lowercase();
    let name = resolve_output_name(input.stem(), &input.extension, &output_ext);
    let path = resolve_output_path(input.relative_dir(), output_root, &name);
    ConversionTask::new(input, output_ext, path)
}
