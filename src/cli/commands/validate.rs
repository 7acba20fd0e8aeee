//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the CUVS configuration file.

use crate::config::{load_config, CuvsConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also applies overrides and validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is not valid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        for line in summary_lines(&config) {
            println!("{line}");
        }
        println!();
        Ok(0)
    }
}

fn summary_lines(config: &CuvsConfig) -> Vec<String> {
    vec![
        "Configuration Summary:".to_string(),
        format!("  Log Level: {}", config.application.log_level),
        format!("  Dry Run: {}", config.application.dry_run),
        format!("  Grouping Mode: {}", config.processing.default_mode),
        format!(
            "  Timeout: {}",
            match config.processing.timeout_secs {
                0 => "none".to_string(),
                secs => format!("{secs}s"),
            }
        ),
        format!(
            "  Service Keys: {}",
            config.processing.service_keys.join(", ")
        ),
        format!("  Output Directory: {}", config.output.directory),
        format!("  Compression Level: {}", config.output.compression_level),
        format!("  Overwrite: {}", config.output.overwrite),
        format!(
            "  RutaArchivos Prefix: {}",
            config.normalization.ruta_archivos_prefix
        ),
        format!(
            "  File Logging: {}",
            if config.logging.local_enabled {
                format!(
                    "{} ({})",
                    config.logging.local_path, config.logging.local_rotation
                )
            } else {
                "disabled".to_string()
            }
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::ENV_LOCK;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_summary_lines_defaults() {
        let lines = summary_lines(&CuvsConfig::default());
        assert!(lines.contains(&"  Grouping Mode: auto".to_string()));
        assert!(lines.contains(&"  Timeout: none".to_string()));
        assert!(lines.contains(&"  Compression Level: 9".to_string()));
        assert!(lines.contains(&"  File Logging: disabled".to_string()));
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let code = ValidateArgs {}
            .execute("nonexistent-cuvs.toml")
            .await
            .unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_valid_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[output]\ncompression_level = 6\n").unwrap();
        file.flush().unwrap();

        let path = file.path().display().to_string();
        let code = ValidateArgs {}.execute(&path).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_invalid_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[processing]\ndefault_mode = \"nested\"\n")
            .unwrap();
        file.flush().unwrap();

        let path = file.path().display().to_string();
        let code = ValidateArgs {}.execute(&path).await.unwrap();
        assert_eq!(code, 2);
    }
}
