// Docpipe - Tiered Document Conversion Pipeline
// Copyright (c) 2025 Docpipe Contributors
// Licensed under the MIT License

//! # docpipe - Tiered Document Conversion Pipeline
//!
//! docpipe converts every document in an *active* input directory into one or
//! more output formats, mirroring the input tree under an output root, and then
//! rotates its input tiers so the next run picks up the next batch:
//!
//! ```text
//! queue -> staging -> active -> {active}_old_<timestamp>
//! ```
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Discovery, naming, conversion, rotation and run sequencing
//! - [`adapters`] - The conversion engine boundary and its command-line backend
//! - [`domain`] - Error types, formats and file references
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docpipe::adapters::engine::CommandEngine;
//! use docpipe::config::load_config;
//! use docpipe::core::pipeline::PipelineController;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("docpipe.toml")?;
//!     let engine = CommandEngine::from_config(&config.engine);
//!
//!     let outcome = PipelineController::new(config, &engine).run().await?;
//!
//!     println!("Converted {} files", outcome.stats.succeeded);
//!     std::process::exit(outcome.exit_code());
//! }
//! ```
//!
//! ## Failure model
//!
//! A run never stops because one file failed. Per-file problems are plain
//! values ([`domain::ConversionFailure`]) that end up in the run statistics and
//! the run report; only configuration problems and the archive step of
//! rotation abort a run through [`domain::DocpipeError`].
//!
//! ## Dry run
//!
//! With `application.dry_run` (or `docpipe run --dry-run`) the full state
//! sequence executes against a store that only logs what it would do. Nothing
//! is written, moved or archived.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
