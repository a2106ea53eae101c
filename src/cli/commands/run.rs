//! Run command implementation
//!
//! This module implements the `run` command: one full pipeline pass over the
//! active tier, followed by rotation.

use crate::adapters::engine::CommandEngine;
use crate::config::DocpipeConfig;
use crate::core::pipeline::{format_bytes, format_duration, PipelineController};
use crate::domain::{DocpipeError, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Dry run mode - full control flow, no files written, moved or archived
    #[arg(long)]
    pub dry_run: bool,

    /// Override the active input directory
    #[arg(long, value_name = "DIR")]
    pub active: Option<PathBuf>,

    /// Override the output directory
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Override the queue directory
    #[arg(long, value_name = "DIR")]
    pub queue: Option<PathBuf>,

    /// Override the staging directory
    #[arg(long, value_name = "DIR")]
    pub staging: Option<PathBuf>,

    /// Convert only; leave the tiers where they are
    #[arg(long)]
    pub no_rotate: bool,
}

impl RunArgs {
    /// Execute the run command
    ///
    /// `loaded` is the result of loading `config_path`.
    pub async fn execute(
        &self,
        config_path: &str,
        loaded: Result<DocpipeConfig>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Starting run command");

        let mut config = match loaded {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        self.apply_overrides(&mut config);

        // Overrides can make directories collide
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            println!("🔍 DRY RUN MODE - No files will be written, moved or archived");
            println!();
        }

        let engine = CommandEngine::from_config(&config.engine);
        if !dry_run && !engine.is_available() {
            tracing::error!(program = %engine.program(), "Converter program not found");
            eprintln!(
                "Converter program '{}' not found. Install it or set engine.program.",
                engine.program()
            );
            return Ok(5); // Fatal error exit code
        }

        let controller = PipelineController::new(config, &engine);
        let outcome = match controller.run().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Run aborted");
                eprintln!("Run aborted: {e}");
                return Ok(abort_exit_code(&e));
            }
        };

        let stats = &outcome.stats;
        println!();
        println!("📊 Run Summary:");
        println!("  Discovered: {}", stats.total_discovered);
        println!("  Succeeded: {}", stats.succeeded);
        println!("  Failed: {}", stats.failed);
        println!("  Skipped: {}", stats.skipped);
        println!("  Data processed: {}", format_bytes(stats.bytes_processed));
        println!("  Duration: {}", format_duration(stats.elapsed()));
        match &outcome.rotation {
            Some(rotation) => {
                println!("  Archive: {}", rotation.archive_path.display());
                println!(
                    "  Promoted: {} staging -> active, {} queue -> staging",
                    rotation.staging_moved, rotation.queue_moved
                );
            }
            None => println!("  Rotation: disabled"),
        }
        if let Some(path) = &outcome.report_path {
            println!("  Report: {}", path.display());
        }
        println!();

        if !stats.failures.is_empty() {
            println!("⚠️  Failed files:");
            for (path, reason) in &stats.failures {
                println!("  - {path}: {reason}");
            }
            println!();
        }

        let exit_code = outcome.exit_code();
        match exit_code {
            0 => println!("✅ Run completed successfully!"),
            1 => println!("⚠️  Run completed with failures"),
            _ => {
                println!("❌ Rotation left the tiers inconsistent:");
                for issue in outcome.rotation.iter().flat_map(|r| r.issues.iter()) {
                    println!("  - {issue}");
                }
                println!("   Inspect the directories before the next run.");
            }
        }

        Ok(exit_code)
    }

    fn apply_overrides(&self, config: &mut DocpipeConfig) {
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if self.no_rotate {
            tracing::info!("Disabling rotation from CLI");
            config.rotation.enabled = false;
        }

        let dirs = &mut config.directories;
        for (name, value, slot) in [
            ("active", &self.active, &mut dirs.active),
            ("output", &self.output, &mut dirs.output),
            ("queue", &self.queue, &mut dirs.queue),
            ("staging", &self.staging, &mut dirs.staging),
        ] {
            if let Some(path) = value {
                tracing::info!(directory = name, path = %path.display(), "Overriding directory from CLI");
                *slot = path.clone();
            }
        }
    }
}

/// Exit code for an error that stopped the run
fn abort_exit_code(err: &DocpipeError) -> i32 {
    match err {
        DocpipeError::Configuration(_) => 2, // Configuration error exit code
        _ => 5,                               // Fatal error exit code
    }
}
