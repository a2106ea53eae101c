//! Input file references and conversion tasks

use super::errors::DocpipeError;
use super::result::Result;
use std::path::{Component, Path, PathBuf};

/// One discovered input file
///
/// Created by the path catalog for a single run and never mutated afterwards.
/// `relative_path` always uses forward slashes and never escapes the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFileRef {
    /// Fully resolved filesystem path
    pub absolute_path: PathBuf,

    /// Path relative to the input root, `/`-separated
    pub relative_path: String,

    /// Lower-cased extension without the dot
    pub extension: String,
}

impl InputFileRef {
    /// Build a reference from a resolved root and a resolved file path
    ///
    /// Both paths must already be absolute. A relative root, a relative file
    /// path, or a file outside the root is a [`DocpipeError::PathMismatch`];
    /// no attempt is made to guess the intended relationship.
    ///
    /// # Examples
    ///
    /// ```
    /// use docpipe::domain::InputFileRef;
    /// use std::path::Path;
    ///
    /// let file = InputFileRef::resolve(
    ///     Path::new("/srv/inputs"),
    ///     Path::new("/srv/inputs/projectA/Doc.PDF"),
    /// ).unwrap();
    /// assert_eq!(file.relative_path, "projectA/Doc.PDF");
    /// assert_eq!(file.extension, "pdf");
    ///
    /// assert!(InputFileRef::resolve(Path::new("inputs"), Path::new("/srv/inputs/a.pdf")).is_err());
    /// ```
    pub fn resolve(root: &Path, file: &Path) -> Result<Self> {
        let mismatch = || DocpipeError::PathMismatch {
            root: root.to_path_buf(),
            path: file.to_path_buf(),
        };

        if !root.is_absolute() || !file.is_absolute() {
            return Err(mismatch());
        }

        let relative = file.strip_prefix(root).map_err(|_| mismatch())?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(seg) => segments.push(seg.to_string_lossy().into_owned()),
                _ => return Err(mismatch()),
            }
        }
        if segments.is_empty() {
            return Err(mismatch());
        }

        let extension = file
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        Ok(Self {
            absolute_path: file.to_path_buf(),
            relative_path: segments.join("/"),
            extension,
        })
    }

    /// File name without its extension
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }

    /// Final segment of the relative path
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Directory portion of the relative path, if the file is nested
    pub fn relative_dir(&self) -> Option<&str> {
        self.relative_path.rfind('/').map(|idx| &self.relative_path[..idx])
    }
}

/// One (input file, output format) pair scheduled for conversion
#[derive(Debug, Clone)]
pub struct ConversionTask<'a> {
    /// The discovered input
    pub input: &'a InputFileRef,

    /// Target extension
    pub output_format: String,

    /// Destination mirroring the input's directory under the output root
    pub output_path: PathBuf,
}

impl<'a> ConversionTask<'a> {
    /// Create a task, or `None` when the target equals the input's own type
    pub fn new(
        input: &'a InputFileRef,
        output_format: impl Into<String>,
        output_path: PathBuf,
    ) -> Option<Self> {
        let output_format = output_format.into().to_ascii_lowercase();
        if output_format == input.extension {
            return None;
        }
        Some(Self {
            input,
            output_format,
            output_path,
        })
    }
}
