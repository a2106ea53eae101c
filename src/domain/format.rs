//! Export formats understood by the conversion engine boundary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A document format keyed by its file extension
///
/// The set is closed: configuration naming any other extension is rejected
/// during validation.
///
/// # Examples
///
/// ```
/// use docpipe::domain::ExportFormat;
/// use std::str::FromStr;
///
/// let format = ExportFormat::from_str("MD").unwrap();
/// assert_eq!(format, ExportFormat::Markdown);
/// assert_eq!(format.extension(), "md");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
    #[serde(rename = "txt")]
    Text,
    #[serde(rename = "md")]
    Markdown,
    Html,
}

impl ExportFormat {
    /// All supported formats, in extension order
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Docx,
        ExportFormat::Html,
        ExportFormat::Markdown,
        ExportFormat::Pdf,
        ExportFormat::Text,
    ];

    /// File extension (without the dot)
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }

    /// Look up a format from a lower-cased, dot-stripped extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Comma-separated list of supported extensions, for error messages
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| {
            format!(
                "Unsupported format '{}'. Supported: {}",
                s,
                Self::supported_list()
            )
        })
    }
}
