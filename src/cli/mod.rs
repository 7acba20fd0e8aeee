//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for CUVS using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// CUVS - RIPS/CUV batch transformation tool
#[derive(Parser, Debug)]
#[command(name = "cuvs")]
#[command(version, about, long_about = None)]
#[command(author = "CUVS Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cuvs.toml", env = "CUVS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CUVS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a batch of claim folders or files into one archive
    Process(commands::process::ProcessArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cli_parse_process() {
        let cli = Cli::parse_from(["cuvs", "process", "sos", "lote"]);
        assert_eq!(cli.config, "cuvs.toml");
        let Commands::Process(args) = cli.command else {
            panic!("expected process command");
        };
        assert_eq!(args.profile, "sos");
        assert_eq!(args.inputs, vec![PathBuf::from("lote")]);
        assert!(args.mode.is_none());
    }

    #[test]
    fn test_cli_parse_process_requires_input() {
        let result = Cli::try_parse_from(["cuvs", "process", "pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_process_with_options() {
        let cli = Cli::parse_from([
            "cuvs",
            "process",
            "excel",
            "a.json",
            "b.json",
            "--mode",
            "flat",
            "--output",
            "salida",
            "--dry-run",
        ]);
        let Commands::Process(args) = cli.command else {
            panic!("expected process command");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.mode.as_deref(), Some("flat"));
        assert_eq!(args.output.as_deref(), Some("salida"));
        assert!(args.dry_run);
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["cuvs", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["cuvs", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["cuvs", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["cuvs", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
