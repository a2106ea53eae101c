//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the docpipe configuration file.

use crate::config::DocpipeConfig;
use crate::core::pipeline::format_bytes;
use crate::domain::Result;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// `loaded` is the result of loading `config_path`.
    pub async fn execute(
        &self,
        config_path: &str,
        loaded: Result<DocpipeConfig>,
    ) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match loaded {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        let conversion = &config.conversion;
        let dirs = &config.directories;

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Input Types: {:?}", conversion.input_set());
        println!("  Output Types: {:?}", conversion.output_set());
        println!(
            "  Max File Size: {}",
            format_bytes(conversion.max_file_size_bytes())
        );
        println!(
            "  Retries: {} ({:?} backoff, {}s delay)",
            conversion.retry_attempts, conversion.retry_backoff, conversion.retry_delay_seconds
        );
        println!("  Active: {}", dirs.active.display());
        println!("  Staging: {}", dirs.staging.display());
        println!("  Queue: {}", dirs.queue.display());
        println!("  Output: {}", dirs.output.display());
        println!(
            "  Rotation: {} (overwrite: {:?}, snapshot outputs: {})",
            if config.rotation.enabled {
                "enabled"
            } else {
                "disabled"
            },
            config.rotation.overwrite,
            config.rotation.snapshot_outputs
        );
        println!(
            "  Engine: {} (timeout {}s)",
            config.engine.program, config.engine.timeout_seconds
        );

        let unmapped = config.engine.unmapped_outputs(conversion);
        if !unmapped.is_empty() {
            println!();
            println!(
                "⚠️  No engine.formats entry for: {} (these conversions will fail)",
                unmapped.join(", ")
            );
        }
        println!();

        Ok(0)
    }
}
