//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "cuvs.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing CUVS configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Validate configuration: cuvs validate-config");
                println!("  3. Process a batch: cuvs process sos <carpeta>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate the sample configuration
    fn generate_config() -> String {
        r#"# CUVS Configuration File
# RIPS/CUV batch transformation tool

[application]
# trace | debug | info | warn | error
log_level = "info"
# Process the batch without writing the archive
dry_run = false

[processing]
# auto | tree | flat
# auto: a single folder is grouped by its sub-folders, loose files form one group
default_mode = "auto"

# Seconds before a run is abandoned (0 = no timeout)
timeout_secs = 0

# Service lists turned into sheets by the Excel conversion, in sheet order
service_keys = [
    "consultas",
    "medicamentos",
    "procedimientos",
    "urgencias",
    "hospitalizacion",
    "recienNacidos",
    "otrosServicios",
]

[output]
# Directory the archive is written to
directory = "."

# DEFLATE level for outer and nested archives (0 = store, 1-9)
compression_level = 9

# Replace an existing archive with the same name
overwrite = false

[normalization]
# RutaArchivos = prefix + folder or file name
ruta_archivos_prefix = 'C:\Users\'

[logging]
# JSON log file in addition to the console
local_enabled = false
local_path = "logs"

# daily | hourly
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CuvsConfig, ProcessingConfig};
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "cuvs.toml".to_string(),
            force: false,
        };

        assert_eq!(args.output, "cuvs.toml");
        assert!(!args.force);
    }

    #[test]
    fn test_generated_config_matches_defaults() {
        let config: CuvsConfig = toml::from_str(&InitArgs::generate_config()).unwrap();
        assert_eq!(config, CuvsConfig::default());
        assert_eq!(
            config.processing.service_keys,
            ProcessingConfig::default().service_keys
        );
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cuvs.toml");
        fs::write(&path, "# mine").unwrap();

        let args = InitArgs {
            output: path.display().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        let args = InitArgs {
            output: path.display().to_string(),
            force: true,
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&path).unwrap().contains("[normalization]"));
    }
}
