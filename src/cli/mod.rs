//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for docpipe using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// docpipe - Tiered document conversion pipeline
#[derive(Parser, Debug)]
#[command(name = "docpipe")]
#[command(version, about, long_about = None)]
#[command(author = "Docpipe Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "docpipe.toml", env = "DOCPIPE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DOCPIPE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert the active tier, then rotate the tiers
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show tier contents, archives and output snapshots
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
