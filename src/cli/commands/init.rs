//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::config::default_config_toml;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "docpipe.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing docpipe configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            EXAMPLE_CONFIG.to_string()
        } else {
            match default_config_toml() {
                Ok(content) => content,
                Err(e) => {
                    println!("❌ Failed to render default configuration");
                    println!("   Error: {e}");
                    return Ok(5); // Fatal error exit code
                }
            }
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Install the converter named in [engine] (pandoc by default)");
                println!("  3. Validate configuration: docpipe validate-config");
                println!("  4. Preview a run: docpipe run --dry-run");
                println!("  5. Run the pipeline: docpipe run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }
}

/// Annotated configuration written by `init --with-examples`
const EXAMPLE_CONFIG: &str = r#"# docpipe configuration
#
# Every run converts the files in `directories.active`, then rotates the tiers:
#   active  -> {active}_old_<timestamp>   (archive)
#   staging -> active                     (converted next run)
#   queue   -> staging                    (converted the run after)
#
# Values may reference environment variables as ${VAR_NAME}. Any key can also
# be overridden with DOCPIPE_<SECTION>_<KEY>, e.g. DOCPIPE_APPLICATION_DRY_RUN.

[application]
log_level = "info"   # trace | debug | info | warn | error
dry_run = false      # plan everything, touch nothing

[conversion]
input_types = ["pdf", "docx"]
output_types = ["md", "txt"]
max_file_size_mb = 100

# Retries after the first attempt; every failure is retried, including
# validation failures of the converter output.
retry_attempts = 2
retry_delay_seconds = 1.0
retry_backoff = "fixed"            # fixed | exponential
retry_backoff_multiplier = 2.0     # exponential only
retry_max_delay_seconds = 30.0     # exponential only

[directories]
active = "./inputs"
output = "./outputs"
queue = "./inputs_queue"
staging = "./inputs_staging"

[rotation]
enabled = true
snapshot_outputs = true   # copy outputs to {output}_<timestamp> before converting
overwrite = "replace"     # replace | skip

[engine]
program = "pandoc"
# Placeholders: {input}, {format}, {output}. Without {output} the converter's
# stdout is used as the export.
args = ["{input}", "--to", "{format}", "--output", "{output}"]
timeout_seconds = 300

[engine.formats]
md = "gfm"
txt = "plain"
html = "html"
docx = "docx"
pdf = "pdf"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"   # daily | hourly | never
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocpipeConfig;
    use tempfile::TempDir;

    #[test]
    fn test_example_config_parses_and_validates() {
        let config: DocpipeConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.conversion.retry_attempts, 2);
        assert_eq!(config.engine.formats.get("md").map(String::as_str), Some("gfm"));
    }

    #[test]
    fn test_default_config_parses_and_validates() {
        let rendered = default_config_toml().unwrap();
        let config: DocpipeConfig = toml::from_str(&rendered).unwrap();
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("docpipe.toml");
        fs::write(&output, "# keep me").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# keep me");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[directories]"));
    }
}
