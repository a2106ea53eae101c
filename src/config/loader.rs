//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BackoffKind, DocpipeConfig, OverwritePolicy};
use crate::domain::errors::DocpipeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into DocpipeConfig
/// 4. Applies environment variable overrides (DOCPIPE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`DocpipeError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use docpipe::config::loader::load_config;
///
/// let config = load_config("docpipe.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DocpipeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DocpipeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DocpipeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: DocpipeConfig = toml::from_str(&contents)
        .map_err(|e| DocpipeError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        DocpipeError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|m| m == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DocpipeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_env<T: std::str::FromStr>(name: &str, val: &str) -> Result<T> {
    val.parse().map_err(|_| {
        DocpipeError::Configuration(format!("Environment variable {name} has invalid value '{val}'"))
    })
}

/// Applies environment variable overrides using DOCPIPE_* prefix
///
/// Environment variables follow the pattern: DOCPIPE_<SECTION>_<KEY>,
/// e.g. DOCPIPE_CONVERSION_RETRY_ATTEMPTS or DOCPIPE_DIRECTORIES_ACTIVE.
/// List values are comma-separated.
fn apply_env_overrides(config: &mut DocpipeConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("DOCPIPE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("DOCPIPE_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_env("DOCPIPE_APPLICATION_DRY_RUN", &val)?;
    }

    // Conversion overrides
    if let Some(val) = var("DOCPIPE_CONVERSION_INPUT_TYPES") {
        config.conversion.input_types = split_list(&val);
    }
    if let Some(val) = var("DOCPIPE_CONVERSION_OUTPUT_TYPES") {
        config.conversion.output_types = split_list(&val);
    }
    if let Some(val) = var("DOCPIPE_CONVERSION_MAX_FILE_SIZE_MB") {
        config.conversion.max_file_size_mb = parse_env("DOCPIPE_CONVERSION_MAX_FILE_SIZE_MB", &val)?;
    }
    if let Some(val) = var("DOCPIPE_CONVERSION_RETRY_ATTEMPTS") {
        config.conversion.retry_attempts = parse_env("DOCPIPE_CONVERSION_RETRY_ATTEMPTS", &val)?;
    }
    if let Some(val) = var("DOCPIPE_CONVERSION_RETRY_DELAY_SECONDS") {
        config.conversion.retry_delay_seconds =
            parse_env("DOCPIPE_CONVERSION_RETRY_DELAY_SECONDS", &val)?;
    }
    if let Some(val) = var("DOCPIPE_CONVERSION_RETRY_BACKOFF") {
        config.conversion.retry_backoff = match val.to_ascii_lowercase().as_str() {
            "fixed" => BackoffKind::Fixed,
            "exponential" => BackoffKind::Exponential,
            other => {
                return Err(DocpipeError::Configuration(format!(
                    "DOCPIPE_CONVERSION_RETRY_BACKOFF must be 'fixed' or 'exponential', got '{other}'"
                )))
            }
        };
    }

    // Directory overrides
    if let Some(val) = var("DOCPIPE_DIRECTORIES_ACTIVE") {
        config.directories.active = PathBuf::from(val);
    }
    if let Some(val) = var("DOCPIPE_DIRECTORIES_OUTPUT") {
        config.directories.output = PathBuf::from(val);
    }
    if let Some(val) = var("DOCPIPE_DIRECTORIES_QUEUE") {
        config.directories.queue = PathBuf::from(val);
    }
    if let Some(val) = var("DOCPIPE_DIRECTORIES_STAGING") {
        config.directories.staging = PathBuf::from(val);
    }

    // Rotation overrides
    if let Some(val) = var("DOCPIPE_ROTATION_ENABLED") {
        config.rotation.enabled = parse_env("DOCPIPE_ROTATION_ENABLED", &val)?;
    }
    if let Some(val) = var("DOCPIPE_ROTATION_SNAPSHOT_OUTPUTS") {
        config.rotation.snapshot_outputs = parse_env("DOCPIPE_ROTATION_SNAPSHOT_OUTPUTS", &val)?;
    }
    if let Some(val) = var("DOCPIPE_ROTATION_OVERWRITE") {
        config.rotation.overwrite = match val.to_ascii_lowercase().as_str() {
            "replace" => OverwritePolicy::Replace,
            "skip" => OverwritePolicy::Skip,
            other => {
                return Err(DocpipeError::Configuration(format!(
                    "DOCPIPE_ROTATION_OVERWRITE must be 'replace' or 'skip', got '{other}'"
                )))
            }
        };
    }

    // Engine overrides
    if let Some(val) = var("DOCPIPE_ENGINE_PROGRAM") {
        config.engine.program = val;
    }
    if let Some(val) = var("DOCPIPE_ENGINE_TIMEOUT_SECONDS") {
        config.engine.timeout_seconds = parse_env("DOCPIPE_ENGINE_TIMEOUT_SECONDS", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("DOCPIPE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("DOCPIPE_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("DOCPIPE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

/// Renders the default configuration as TOML, with a header comment
pub fn default_config_toml() -> Result<String> {
    let body = toml::to_string_pretty(&DocpipeConfig::default())
        .map_err(|e| DocpipeError::Serialization(e.to_string()))?;
    Ok(format!(
        "# docpipe configuration\n\
         # Tiers rotate queue -> staging -> active -> archive after every run.\n\
         # Values may reference environment variables as ${{VAR_NAME}}.\n\n{body}"
    ))
}
