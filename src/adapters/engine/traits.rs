//! Conversion engine abstraction traits
//!
//! The engine is an external collaborator. docpipe only needs two things
//! from it: turn an input file into a document handle, and export that handle
//! to a format. Everything else about the engine is opaque.

use crate::domain::{EngineError, ExportFormat};
use async_trait::async_trait;
use std::path::Path;

/// Converter that turns an input file into a document handle
#[async_trait]
pub trait ConversionEngine: Send + Sync {
    /// Short name used in logs and the run report
    fn name(&self) -> &str;

    /// Parse the file at `path`
    ///
    /// `Ok(None)` means the engine ran but produced no document.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the input is unreadable or corrupt.
    async fn convert(&self, path: &Path) -> Result<Option<Box<dyn DocumentHandle>>, EngineError>;
}

/// A parsed document exposing a capability map keyed by format
///
/// Presence and invocability are reported separately: a handle can declare a
/// capability it cannot service.
#[async_trait]
pub trait DocumentHandle: Send + Sync {
    /// Formats this handle declares it can export
    fn capabilities(&self) -> Vec<ExportFormat>;

    /// Whether a declared capability can actually be invoked
    fn is_invocable(&self, format: ExportFormat) -> bool;

    /// Export the document
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the export fails inside the engine.
    async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, EngineError>;

    /// Whether `format` is declared
    fn declares(&self, format: ExportFormat) -> bool {
        self.capabilities().contains(&format)
    }
}
