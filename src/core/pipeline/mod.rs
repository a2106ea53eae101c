//! Pipeline run: sequencing, statistics and reporting
//!
//! - [`controller`] - The state machine driving one run
//! - [`stats`] - Counters and the summary block
//! - [`report`] - The `run_report_{timestamp}.txt` file

pub mod controller;
pub mod report;
pub mod stats;

pub use controller::{PipelineController, RunOutcome, RunState};
pub use report::RunReport;
pub use stats::{format_bytes, format_duration, RunStats};
