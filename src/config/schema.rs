//! Configuration schema types
//!
//! This module defines the configuration structure for CUVS. Every section has
//! defaults, so an empty `cuvs.toml` is a valid configuration.

use crate::core::export::archive::DEFAULT_COMPRESSION_LEVEL;
use crate::core::transform::flatten::USUARIOS_TABLE;
use crate::core::transform::DEFAULT_SERVICE_KEYS;
use crate::domain::{GroupingMode, DEFAULT_RUTA_ARCHIVOS_PREFIX};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

/// Main CUVS configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CuvsConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Batch processing settings
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Output archive settings
    #[serde(default)]
    pub output: OutputConfig,

    /// CUV normalization settings
    #[serde(default)]
    pub normalization: NormalizationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CuvsConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.processing.validate()?;
        self.output.validate()?;
        self.normalization.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (process the batch but do not write the archive)
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

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessingConfig {
    /// Grouping mode: `auto` picks tree for directories and flat for loose files
    #[serde(default = "default_mode")]
    pub default_mode: String,

    /// Caller-level timeout for one run in seconds (0 = no timeout)
    #[serde(default)]
    pub timeout_secs: u64,

    /// Service keys read by the Excel conversion, in sheet order
    #[serde(default = "default_service_keys")]
    pub service_keys: Vec<String>,
}

impl ProcessingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_mode != "auto" && GroupingMode::from_str(&self.default_mode).is_err() {
            return Err(format!(
                "Invalid processing.default_mode '{}'. Must be one of: auto, tree, flat",
                self.default_mode
            ));
        }

        if self.service_keys.is_empty() {
            return Err("processing.service_keys cannot be empty".to_string());
        }

        let mut seen = HashSet::new();
        for key in &self.service_keys {
            if key.trim().is_empty() {
                return Err("processing.service_keys cannot contain empty keys".to_string());
            }
            if let Some(problem) = sheet_name_problem(key) {
                return Err(format!(
                    "Invalid processing.service_keys entry '{key}': {problem}"
                ));
            }
            // Sheet names are compared case-insensitively
            if !seen.insert(key.to_lowercase()) {
                return Err(format!("Duplicate processing.service_keys entry '{key}'"));
            }
        }

        Ok(())
    }

    /// Explicit grouping mode, `None` when set to `auto`
    pub fn grouping_mode(&self) -> Option<GroupingMode> {
        GroupingMode::from_str(&self.default_mode).ok()
    }

    /// Run timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Service keys become worksheet names, so they follow the `.xlsx` sheet name rules
fn sheet_name_problem(key: &str) -> Option<&'static str> {
    if key.chars().count() > MAX_SHEET_NAME_CHARS {
        return Some("sheet names are limited to 31 characters");
    }
    if key.chars().any(|c| INVALID_SHEET_CHARS.contains(c)) {
        return Some("sheet names cannot contain []:*?/\\");
    }
    if key.starts_with('\'') || key.ends_with('\'') {
        return Some("sheet names cannot start or end with an apostrophe");
    }
    if key.eq_ignore_ascii_case(USUARIOS_TABLE) {
        return Some("'usuarios' is reserved for the users sheet");
    }
    if key.eq_ignore_ascii_case("history") {
        return Some("'History' is reserved by Excel");
    }
    None
}

const MAX_SHEET_NAME_CHARS: usize = 31;
const INVALID_SHEET_CHARS: &str = "[]:*?/\\";

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            timeout_secs: 0,
            service_keys: default_service_keys(),
        }
    }
}

/// Output archive configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Directory the archive is written to
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// DEFLATE level (0 = store, 1-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Replace an existing archive with the same name
    #[serde(default)]
    pub overwrite: bool,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.is_empty() {
            return Err("output.directory cannot be empty".to_string());
        }

        if self.compression_level > 9 {
            return Err(format!(
                "output.compression_level must be between 0 and 9, got {}",
                self.compression_level
            ));
        }

        Ok(())
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            compression_level: default_compression_level(),
            overwrite: false,
        }
    }
}

/// CUV normalization configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizationConfig {
    /// Prefix of the `RutaArchivos` value
    #[serde(default = "default_ruta_archivos_prefix")]
    pub ruta_archivos_prefix: String,
}

impl NormalizationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.ruta_archivos_prefix.is_empty() {
            return Err("normalization.ruta_archivos_prefix cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            ruta_archivos_prefix: default_ruta_archivos_prefix(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
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

fn default_mode() -> String {
    "auto".to_string()
}

fn default_service_keys() -> Vec<String> {
    DEFAULT_SERVICE_KEYS.iter().map(|k| k.to_string()).collect()
}

fn default_output_directory() -> String {
    ".".to_string()
}

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

fn default_ruta_archivos_prefix() -> String {
    DEFAULT_RUTA_ARCHIVOS_PREFIX.to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CuvsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.compression_level, 9);
        assert_eq!(config.processing.service_keys.len(), 7);
        assert_eq!(config.processing.service_keys[0], "consultas");
        assert_eq!(config.normalization.ruta_archivos_prefix, "C:\\Users\\");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: CuvsConfig = toml::from_str("").unwrap();
        assert_eq!(config, CuvsConfig::default());
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
            dry_run: false,
        };
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_processing_config_validation() {
        let mut config = ProcessingConfig::default();
        assert!(config.validate().is_ok());

        config.default_mode = "nested".to_string();
        assert!(config.validate().is_err());

        config.default_mode = "flat".to_string();
        assert!(config.validate().is_ok());

        config.service_keys = vec![];
        assert!(config.validate().is_err());

        config.service_keys = vec!["consultas".to_string(), "consultas".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.contains("Duplicate"));

        config.service_keys = vec![" ".to_string()];
        assert!(config.validate().is_err());

        config.service_keys = vec!["consultas".to_string(), "Consultas".to_string()];
        assert!(config.validate().unwrap_err().contains("Duplicate"));
    }

    #[test]
    fn test_service_keys_must_be_sheet_names() {
        let mut config = ProcessingConfig::default();

        for bad in [
            "procedimientos/quirurgicos",
            "otros[servicios]",
            "a:b",
            "consultas?",
            "serviciosDeApoyoDiagnosticoYTerapeutico",
            "'consultas",
            "usuarios",
            "USUARIOS",
        ] {
            config.service_keys = vec![bad.to_string()];
            let err = config.validate().unwrap_err();
            assert!(err.contains("Invalid processing.service_keys"), "{bad}: {err}");
        }

        config.service_keys = vec!["recienNacidos".to_string(), "terapias".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_processing_grouping_mode_and_timeout() {
        let mut config = ProcessingConfig::default();
        assert_eq!(config.grouping_mode(), None);
        assert_eq!(config.timeout(), None);

        config.default_mode = "tree".to_string();
        config.timeout_secs = 30;
        assert_eq!(config.grouping_mode(), Some(GroupingMode::Tree));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_output_config_validation() {
        let mut config = OutputConfig::default();
        assert!(config.validate().is_ok());

        config.compression_level = 0;
        assert!(config.validate().is_ok());

        config.compression_level = 10;
        assert!(config.validate().is_err());

        config.compression_level = 9;
        config.directory = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "hourly".to_string();
        assert!(config.validate().is_ok());

        config.local_rotation = "size".to_string();
        assert!(config.validate().is_err());

        config.local_rotation = "daily".to_string();
        config.local_enabled = true;
        config.local_path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_normalization_config_validation() {
        let config = NormalizationConfig {
            ruta_archivos_prefix: String::new(),
        };
        assert!(config.validate().is_err());
    }
}
