// Docpipe - Tiered Document Conversion Pipeline
// Copyright (c) 2025 Docpipe Contributors
// Licensed under the MIT License

use docpipe::cli::{Cli, Commands};
use docpipe::config::{load_config, DocpipeConfig};
use docpipe::domain::Result;
use docpipe::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Loaded once; file logging and the default level come from it when it
    // loads, and commands report config problems themselves.
    let loaded = load_config(&cli.config);
    let logging_config = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "docpipe - Tiered Document Conversion Pipeline"
    );

    if let Ok(config) = &loaded {
        tracing::debug!(config_path = %cli.config, "Configuration loaded");
        config.log_warnings();
    }

    let exit_code = match execute_command(&cli, loaded).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // process::exit skips destructors; flush the file writer first
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, loaded: Result<DocpipeConfig>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config, loaded).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config, loaded).await,
        Commands::Status(args) => args.execute(&cli.config, loaded).await,
        Commands::Init(args) => args.execute().await,
    }
}
