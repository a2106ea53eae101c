//! Configuration management for docpipe.
//!
//! # Overview
//!
//! docpipe uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `DOCPIPE_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation before the pipeline ever sees the configuration
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run
//! - [`ConversionConfig`] - Input/output types, size ceiling, retry policy
//! - [`DirectoriesConfig`] - Active, staging, queue and output directories
//! - [`RotationConfig`] - Rotation, output snapshots, overwrite policy
//! - [`EngineConfig`] - External converter program
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [conversion]
//! input_types = ["pdf", "docx"]
//! output_types = ["md"]
//! max_file_size_mb = 100
//! retry_attempts = 2
//! retry_delay_seconds = 1.0
//!
//! [directories]
//! active = "./inputs"
//! output = "./outputs"
//! queue = "./inputs_queue"
//! staging = "./inputs_staging"
//!
//! [engine]
//! program = "pandoc"
//! args = ["{input}", "--to", "{format}", "--output", "{output}"]
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{default_config_toml, load_config};
pub use schema::{
    ApplicationConfig, BackoffKind, ConversionConfig, DirectoriesConfig, DocpipeConfig,
    EngineConfig, LoggingConfig, OverwritePolicy, RotationConfig,
};
