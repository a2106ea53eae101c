//! Configuration schema types
//!
//! This module defines the configuration structure for docpipe. Every section
//! has defaults matching the stock `docpipe init` file, so a configuration
//! only needs to name what it changes.

use crate::domain::ExportFormat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

/// Main docpipe configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocpipeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// What to convert and how hard to try
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// The tier directories and the output tree
    #[serde(default)]
    pub directories: DirectoriesConfig,

    /// Rotation and snapshot behaviour
    #[serde(default)]
    pub rotation: RotationConfig,

    /// External converter program
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DocpipeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.conversion.validate()?;
        self.directories.validate()?;
        self.engine.validate(&self.conversion)?;
        self.logging.validate()?;
        Ok(())
    }

    /// Log problems that do not make the configuration invalid
    ///
    /// Call once logging is initialised.
    pub fn log_warnings(&self) {
        for ext in self.engine.unmapped_outputs(&self.conversion) {
            tracing::warn!(
                output_type = %ext,
                "No engine.formats entry for output type; conversions to it will fail"
            );
        }
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (full control flow, no filesystem mutation)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Delay shape between conversion attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same delay before every retry
    #[default]
    Fixed,
    /// Delay multiplied after every retry, capped at the maximum
    Exponential,
}

/// Conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Extensions picked up from the active tier
    #[serde(default = "default_input_types")]
    pub input_types: Vec<String>,

    /// Extensions produced for every input
    #[serde(default = "default_output_types")]
    pub output_types: Vec<String>,

    /// Files larger than this are skipped
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Retries after the first attempt
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay before a retry, in seconds
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: f64,

    /// Fixed or exponential retry delay
    #[serde(default)]
    pub retry_backoff: BackoffKind,

    /// Multiplier applied per retry when `retry_backoff = "exponential"`
    #[serde(default = "default_backoff_multiplier")]
    pub retry_backoff_multiplier: f64,

    /// Upper bound on the exponential delay, in seconds
    #[serde(default = "default_retry_max_delay_seconds")]
    pub retry_max_delay_seconds: f64,
}

impl ConversionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.input_types.is_empty() || self.output_types.is_empty() {
            return Err(
                "conversion.input_types and conversion.output_types must not be empty".to_string(),
            );
        }

        if self.input_set() == self.output_set() {
            return Err(
                "conversion.input_types cannot be identical to conversion.output_types"
                    .to_string(),
            );
        }

        for (field, types) in [
            ("input_types", &self.input_types),
            ("output_types", &self.output_types),
        ] {
            let unsupported: Vec<&str> = types
                .iter()
                .filter(|t| ExportFormat::from_extension(t).is_none())
                .map(String::as_str)
                .collect();
            if !unsupported.is_empty() {
                return Err(format!(
                    "Unsupported conversion.{} [{}]. Supported: {}",
                    field,
                    unsupported.join(", "),
                    ExportFormat::supported_list()
                ));
            }
        }

        if self.max_file_size_mb == 0 {
            return Err("conversion.max_file_size_mb must be > 0".to_string());
        }

        if self.retry_attempts > 10 {
            return Err(format!(
                "conversion.retry_attempts must be <= 10, got {}",
                self.retry_attempts
            ));
        }

        if !(self.retry_delay_seconds.is_finite() && self.retry_delay_seconds > 0.0) {
            return Err(format!(
                "conversion.retry_delay_seconds must be > 0, got {}",
                self.retry_delay_seconds
            ));
        }

        if self.retry_delay_seconds > MAX_RETRY_DELAY_SECONDS {
            return Err(format!(
                "conversion.retry_delay_seconds must be <= {}, got {}",
                MAX_RETRY_DELAY_SECONDS, self.retry_delay_seconds
            ));
        }

        if self.retry_backoff == BackoffKind::Exponential {
            if !(self.retry_backoff_multiplier.is_finite() && self.retry_backoff_multiplier >= 1.0)
            {
                return Err(format!(
                    "conversion.retry_backoff_multiplier must be >= 1.0, got {}",
                    self.retry_backoff_multiplier
                ));
            }
            if self.retry_max_delay_seconds < self.retry_delay_seconds {
                return Err(
                    "conversion.retry_max_delay_seconds must be >= retry_delay_seconds"
                        .to_string(),
                );
            }
            if !(self.retry_max_delay_seconds.is_finite()
                && self.retry_max_delay_seconds <= MAX_RETRY_DELAY_SECONDS)
            {
                return Err(format!(
                    "conversion.retry_max_delay_seconds must be <= {}, got {}",
                    MAX_RETRY_DELAY_SECONDS, self.retry_max_delay_seconds
                ));
            }
        }

        Ok(())
    }

    /// Normalised input extensions
    pub fn input_set(&self) -> BTreeSet<String> {
        normalise_types(&self.input_types)
    }

    /// Normalised output extensions
    pub fn output_set(&self) -> BTreeSet<String> {
        normalise_types(&self.output_types)
    }

    /// Size ceiling in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    /// Base retry delay
    pub fn retry_delay(&self) -> Duration {
        seconds_to_duration(self.retry_delay_seconds)
    }

    /// Cap on the exponential retry delay
    pub fn retry_max_delay(&self) -> Duration {
        seconds_to_duration(self.retry_max_delay_seconds)
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input_types: default_input_types(),
            output_types: default_output_types(),
            max_file_size_mb: default_max_file_size_mb(),
            retry_attempts: default_retry_attempts(),
            retry_delay_seconds: default_retry_delay_seconds(),
            retry_backoff: BackoffKind::Fixed,
            retry_backoff_multiplier: default_backoff_multiplier(),
            retry_max_delay_seconds: default_retry_max_delay_seconds(),
        }
    }
}

/// Longest accepted retry delay, in seconds
pub const MAX_RETRY_DELAY_SECONDS: f64 = 3600.0;

// Clamped so unvalidated values never panic in Duration conversion
fn seconds_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_RETRY_DELAY_SECONDS)).unwrap_or_default()
}

fn normalise_types(types: &[String]) -> BTreeSet<String> {
    types
        .iter()
        .map(|t| t.trim().trim_start_matches('.').to_ascii_lowercase())
        .collect()
}

/// Tier directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoriesConfig {
    /// Tier processed by the current run
    #[serde(default = "default_active_dir")]
    pub active: PathBuf,

    /// Root of the converted output tree
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,

    /// Tier for the run after next
    #[serde(default = "default_queue_dir")]
    pub queue: PathBuf,

    /// Tier for the next run
    #[serde(default = "default_staging_dir")]
    pub staging: PathBuf,
}

impl DirectoriesConfig {
    fn validate(&self) -> Result<(), String> {
        let named = [
            ("active", &self.active),
            ("output", &self.output),
            ("queue", &self.queue),
            ("staging", &self.staging),
        ];

        for (name, path) in &named {
            if path.as_os_str().is_empty() {
                return Err(format!("directories.{name} cannot be empty"));
            }
        }

        for (i, (a_name, a)) in named.iter().enumerate() {
            for (b_name, b) in &named[i + 1..] {
                if a == b {
                    return Err(format!(
                        "directories.{a_name} and directories.{b_name} must differ (both '{}')",
                        a.display()
                    ));
                }
            }
        }

        Ok(())
    }
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            active: default_active_dir(),
            output: default_output_dir(),
            queue: default_queue_dir(),
            staging: default_staging_dir(),
        }
    }
}

/// What happens when a relocated entry already exists at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Remove the existing entry, then move
    #[default]
    Replace,
    /// Leave both in place and count the entry as not moved
    Skip,
}

/// Rotation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Rotate tiers after conversion
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Copy the output tree to `{output}_{timestamp}` before converting
    #[serde(default = "default_true")]
    pub snapshot_outputs: bool,

    /// Conflict handling while promoting tiers
    #[serde(default)]
    pub overwrite: OverwritePolicy,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshot_outputs: true,
            overwrite: OverwritePolicy::Replace,
        }
    }
}

/// External converter program
///
/// `args` may contain the placeholders `{input}`, `{format}` and `{output}`.
/// When `{output}` is absent the converter's stdout is taken as the export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Program name or path
    #[serde(default = "default_engine_program")]
    pub program: String,

    /// Argument template
    #[serde(default = "default_engine_args")]
    pub args: Vec<String>,

    /// Per-invocation timeout in seconds
    #[serde(default = "default_engine_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Output extension -> converter format name
    #[serde(default = "default_engine_formats")]
    pub formats: BTreeMap<String, String>,
}

impl EngineConfig {
    fn validate(&self, conversion: &ConversionConfig) -> Result<(), String> {
        if self.program.trim().is_empty() {
            return Err("engine.program cannot be empty".to_string());
        }

        if !self.args.iter().any(|a| a.contains("{input}")) {
            return Err("engine.args must reference {input}".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("engine.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }

    /// Output types with no `formats` entry
    ///
    /// Not a configuration error: conversions to them fail per task.
    pub fn unmapped_outputs(&self, conversion: &ConversionConfig) -> Vec<String> {
        conversion
            .output_set()
            .into_iter()
            .filter(|ext| !self.formats.contains_key(ext))
            .collect()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: default_engine_program(),
            args: default_engine_args(),
            timeout_seconds: default_engine_timeout_seconds(),
            formats: default_engine_formats(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_input_types() -> Vec<String> {
    vec!["pdf".to_string()]
}

fn default_output_types() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_max_file_size_mb() -> u64 {
    100
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_delay_seconds() -> f64 {
    1.0
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_retry_max_delay_seconds() -> f64 {
    30.0
}

fn default_active_dir() -> PathBuf {
    PathBuf::from("./inputs")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./outputs")
}

fn default_queue_dir() -> PathBuf {
    PathBuf::from("./inputs_queue")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("./inputs_staging")
}

fn default_engine_program() -> String {
    "pandoc".to_string()
}

fn default_engine_args() -> Vec<String> {
    ["{input}", "--to", "{format}", "--output", "{output}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_engine_timeout_seconds() -> u64 {
    300
}

fn default_engine_formats() -> BTreeMap<String, String> {
    [
        ("docx", "docx"),
        ("html", "html"),
        ("md", "markdown"),
        ("pdf", "pdf"),
        ("txt", "plain"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
