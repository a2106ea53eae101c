//! Core pipeline logic for docpipe.
//!
//! # Modules
//!
//! - [`catalog`] - Input discovery with resolved, root-relative paths
//! - [`store`] - Atomic writes, directory relocation and snapshots
//! - [`rotation`] - The archive and promote sequence across the tiers
//! - [`naming`] - Collision-safe output names and mirrored output paths
//! - [`convert`] - Retrying, validating conversion of single tasks
//! - [`pipeline`] - Run sequencing, statistics and the run report
//!
//! # Run Workflow
//!
//! 1. **Prepare**: Create the tier and output directories, snapshot outputs
//! 2. **Discover**: List matching files in the active tier
//! 3. **Validate**: Skip files over the size ceiling
//! 4. **Convert**: Every file to every output type, with retries
//! 5. **Rotate**: Archive active, promote staging, promote queue
//! 6. **Report**: Write the run report and log the statistics
//!
//! # Example
//!
//! ```rust,no_run
//! use docpipe::adapters::engine::CommandEngine;
//! use docpipe::config::load_config;
//! use docpipe::core::pipeline::PipelineController;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("docpipe.toml")?;
//! let engine = CommandEngine::from_config(&config.engine);
//!
//! let outcome = PipelineController::new(config, &engine).run().await?;
//!
//! println!("Succeeded: {}", outcome.stats.succeeded);
//! println!("Failed: {}", outcome.stats.failed);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod convert;
pub mod naming;
pub mod pipeline;
pub mod rotation;
pub mod store;
pub mod timestamp;
