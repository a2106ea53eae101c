//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output
//! - Configurable log levels (`RUST_LOG` wins when set)
//! - Local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use docpipe::logging::init_logging;
//! use docpipe::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a banner marking the start of a pipeline phase
///
/// # Example
///
/// ```no_run
/// use docpipe::log_phase;
///
/// log_phase!("DISCOVERY", "Scanning for input files");
/// ```
#[macro_export]
macro_rules! log_phase {
    ($phase:expr, $description:expr) => {
        tracing::info!("{}", "=".repeat(70));
        tracing::info!(phase = $phase, "{} PHASE: {}", $phase, $description);
        tracing::info!("{}", "=".repeat(70));
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use docpipe::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Converter timed out");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Conversion attempt failed, will retry"
        );
    };
}

/// Log the final outcome of one conversion task
///
/// # Example
///
/// ```no_run
/// use docpipe::log_file_outcome;
///
/// log_file_outcome!("SUCCESS", "docs/a.pdf", "outputs/docs/a_from_pdf.md");
/// ```
#[macro_export]
macro_rules! log_file_outcome {
    ("FAILED", $path:expr, $detail:expr) => {
        tracing::error!(outcome = "FAILED", file = %$path, detail = %$detail, "Conversion failed");
    };
    ($outcome:expr, $path:expr, $detail:expr) => {
        tracing::info!(outcome = $outcome, file = %$path, detail = %$detail, "Conversion outcome");
    };
}
