//! Domain error types
//!
//! This module defines the error hierarchy for docpipe. Run-level errors are
//! carried by [`DocpipeError`]; per-task conversion failures are plain values
//! ([`ConversionFailure`]) so the pipeline never has to catch them.

use std::path::PathBuf;
use thiserror::Error;

/// Main docpipe error type
///
/// Every variant that reaches the CLI is either a configuration problem or a
/// fatal run condition. Per-file problems never surface through this type.
#[derive(Debug, Error)]
pub enum DocpipeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A relative path was requested from paths that are not both absolute,
    /// or the candidate does not live under the root
    #[error("Path mismatch: {path} is not a resolved descendant of {root}")]
    PathMismatch { root: PathBuf, path: PathBuf },

    /// A required directory could not be created or accessed
    #[error("Directory error for {path}: {message}")]
    Directory { path: PathBuf, message: String },

    /// Rotation archive step failed; no tier was advanced
    #[error("Rotation aborted: {0}")]
    Rotation(String),

    /// Conversion engine errors that prevent the run from starting
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Errors raised at the conversion engine boundary
///
/// The engine is a black box: any failure is reported through one of these
/// variants, never as a successful call with missing content.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The input could not be read or parsed by the engine
    #[error("Unreadable input {path}: {message}")]
    UnreadableInput { path: PathBuf, message: String },

    /// The engine program could not be started
    #[error("Failed to launch converter '{program}': {message}")]
    LaunchFailed { program: String, message: String },

    /// The engine program ran but reported failure
    #[error("Converter exited with status {status}: {stderr}")]
    ExitStatus { status: i32, stderr: String },

    /// The engine did not finish within the configured timeout
    #[error("Converter timed out after {0}s")]
    Timeout(u64),

    /// Export for a format failed inside the engine
    #[error("Export to {format} failed: {message}")]
    ExportFailed { format: String, message: String },
}

/// Reason a single conversion task failed
///
/// One variant per validation check performed on an engine result, plus the
/// engine and write failures. The `Display` text is what lands in the run
/// report and the failure list of the run statistics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionFailure {
    /// The engine produced no document handle
    #[error("Conversion produced no document")]
    NoDocument,

    /// The output extension has no export capability mapping
    #[error("No export mapping for output type: {0}")]
    NoExportMapping(String),

    /// The handle does not declare the requested capability
    #[error("Document has no '{format}' export capability. Available: [{}]", available.join(", "))]
    CapabilityAbsent {
        format: String,
        available: Vec<String>,
    },

    /// The capability is declared but cannot be invoked
    #[error("Document declares '{0}' export but it cannot be invoked")]
    CapabilityNotInvocable(String),

    /// The export returned zero bytes
    #[error("Export returned empty content")]
    EmptyContent,

    /// The engine raised an error
    #[error("Conversion error: {0}")]
    Engine(String),

    /// Writing the output failed
    #[error("Write error: {0}")]
    Write(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for DocpipeError {
    fn from(err: std::io::Error) -> Self {
        DocpipeError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DocpipeError {
    fn from(err: serde_json::Error) -> Self {
        DocpipeError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DocpipeError {
    fn from(err: toml::de::Error) -> Self {
        DocpipeError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from directory traversal errors
impl From<walkdir::Error> for DocpipeError {
    fn from(err: walkdir::Error) -> Self {
        match err.path() {
            Some(path) => DocpipeError::Directory {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
            None => DocpipeError::Io(err.to_string()),
        }
    }
}

impl From<EngineError> for ConversionFailure {
    fn from(err: EngineError) -> Self {
        ConversionFailure::Engine(err.to_string())
    }
}
