//! Conversion engine boundary
//!
//! [`ConversionEngine`] and [`DocumentHandle`] are the only view the pipeline
//! has of the converter. [`CommandEngine`] is the bundled implementation that
//! drives an external program.

pub mod command;
pub mod traits;

pub use command::CommandEngine;
pub use traits::{ConversionEngine, DocumentHandle};
