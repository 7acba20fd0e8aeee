// CUVS - RIPS/CUV Batch Transformation Tool
// Copyright (c) 2025 CUVS Contributors
// Licensed under the MIT License

use clap::Parser;
use cuvs::cli::{Cli, Commands};
use cuvs::config::load_config_or_default;
use cuvs::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging settings come from the config file when it loads; a broken
    // config is reported by the command itself.
    let logging_config = load_config_or_default(&cli.config)
        .map(|c| (c.application.log_level, c.logging))
        .ok();
    let (config_level, logging_config) = logging_config.unzip();
    let log_level = cli
        .log_level
        .clone()
        .or(config_level)
        .unwrap_or_else(|| "info".to_string());
    let guard = match init_logging(&log_level, &logging_config.unwrap_or_default()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "CUVS - RIPS/CUV Batch Transformation Tool"
    );

    // Create shutdown signal channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        } else {
            tracing::info!("Received SIGINT (Ctrl+C), stopping");
            let _ = shutdown_tx.send(true);
        }
    });

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // Flush the file writer before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Process(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
