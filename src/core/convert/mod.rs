//! Conversion of individual tasks
//!
//! - [`orchestrator`] - Retrying, validating conversion of one task
//! - [`retry`] - Delay policy between attempts

pub mod orchestrator;
pub mod retry;

pub use orchestrator::{ConversionOrchestrator, ConversionSuccess};
pub use retry::RetryPolicy;
