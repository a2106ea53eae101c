//! Domain models and types for docpipe.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **File references** ([`InputFileRef`], [`ConversionTask`])
//! - **Formats** ([`ExportFormat`])
//! - **Error types** ([`DocpipeError`], [`EngineError`], [`ConversionFailure`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Run-level operations return [`Result<T, DocpipeError>`]. A failing
//! conversion task is not an error at this level; it is described by a
//! [`ConversionFailure`] value and recorded in the run statistics.

pub mod errors;
pub mod file;
pub mod format;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{ConversionFailure, DocpipeError, EngineError};
pub use file::{ConversionTask, InputFileRef};
pub use format::ExportFormat;
pub use result::Result;
