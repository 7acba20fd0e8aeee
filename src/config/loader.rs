//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CuvsConfig;
use crate::domain::errors::CuvsError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CuvsConfig
/// 4. Applies environment variable overrides (CUVS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use cuvs::config::loader::load_config;
///
/// let config = load_config("cuvs.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CuvsConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CuvsError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CuvsError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Loads configuration, falling back to defaults when the file does not exist
///
/// Environment overrides and validation still apply to the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but is invalid, or the overrides are invalid.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<CuvsConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(
        path = %path.display(),
        "Configuration file not found, using defaults"
    );
    finish(CuvsConfig::default())
}

/// Parses configuration text (substitution, overrides and validation included)
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or the result fails validation.
pub fn parse_config(contents: &str) -> Result<CuvsConfig> {
    let contents = substitute_env_vars(contents)?;

    let config: CuvsConfig = toml::from_str(&contents)
        .map_err(|e| CuvsError::Configuration(format!("Failed to parse TOML: {e}")))?;

    finish(config)
}

fn finish(mut config: CuvsConfig) -> Result<CuvsConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        CuvsError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CuvsError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
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
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(CuvsError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using CUVS_* prefix
///
/// Environment variables follow the pattern: CUVS_<SECTION>_<KEY>
/// For example: CUVS_OUTPUT_COMPRESSION_LEVEL, CUVS_PROCESSING_DEFAULT_MODE
fn apply_env_overrides(config: &mut CuvsConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("CUVS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("CUVS_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_bool("CUVS_APPLICATION_DRY_RUN", &val)?;
    }

    // Processing overrides
    if let Ok(val) = std::env::var("CUVS_PROCESSING_DEFAULT_MODE") {
        config.processing.default_mode = val;
    }
    if let Ok(val) = std::env::var("CUVS_PROCESSING_TIMEOUT_SECS") {
        config.processing.timeout_secs = parse_number("CUVS_PROCESSING_TIMEOUT_SECS", &val)?;
    }
    if let Ok(val) = std::env::var("CUVS_PROCESSING_SERVICE_KEYS") {
        config.processing.service_keys = val
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
    }

    // Output overrides
    if let Ok(val) = std::env::var("CUVS_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }
    if let Ok(val) = std::env::var("CUVS_OUTPUT_COMPRESSION_LEVEL") {
        config.output.compression_level = parse_number("CUVS_OUTPUT_COMPRESSION_LEVEL", &val)?;
    }
    if let Ok(val) = std::env::var("CUVS_OUTPUT_OVERWRITE") {
        config.output.overwrite = parse_bool("CUVS_OUTPUT_OVERWRITE", &val)?;
    }

    // Normalization overrides
    if let Ok(val) = std::env::var("CUVS_NORMALIZATION_RUTA_ARCHIVOS_PREFIX") {
        config.normalization.ruta_archivos_prefix = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CUVS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("CUVS_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("CUVS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("CUVS_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    value.trim().parse().map_err(|_| {
        CuvsError::Configuration(format!("{name} must be 'true' or 'false', got '{value}'"))
    })
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CuvsError::Configuration(format!("{name} must be a non-negative integer, got '{value}'"))
    })
}

// Serializes tests that read or mutate process-wide CUVS_* variables
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("CUVS_TEST_PREFIX", "D:\\rips\\");
        let input = "ruta_archivos_prefix = '${CUVS_TEST_PREFIX}'";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "ruta_archivos_prefix = 'D:\\rips\\'");
        std::env::remove_var("CUVS_TEST_PREFIX");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var("CUVS_MISSING_VAR");
        let input = "directory = \"${CUVS_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("CUVS_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var("CUVS_COMMENTED_VAR");
        let input = "# directory = \"${CUVS_COMMENTED_VAR}\"\ndirectory = \"out\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-cuvs.toml");
        assert!(matches!(result, Err(CuvsError::Configuration(_))));
    }

    #[test]
    fn test_load_config_or_default_missing_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = load_config_or_default("nonexistent-cuvs.toml").unwrap();
        assert_eq!(config.output.compression_level, 9);
    }

    #[test]
    fn test_load_config_valid() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let toml_content = r#"
[application]
log_level = "debug"

[processing]
default_mode = "flat"
service_keys = ["consultas", "urgencias"]

[output]
directory = "salida"
compression_level = 6

[normalization]
ruta_archivos_prefix = 'D:\Facturas\'
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.processing.service_keys, vec!["consultas", "urgencias"]);
        assert_eq!(config.output.directory, "salida");
        assert_eq!(config.output.compression_level, 6);
        assert_eq!(config.normalization.ruta_archivos_prefix, "D:\\Facturas\\");
        assert!(!config.logging.local_enabled);
    }

    #[test]
    fn test_parse_config_rejects_invalid_values() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let result = parse_config("[output]\ncompression_level = 11\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("compression_level"));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("CUVS_OUTPUT_COMPRESSION_LEVEL", "3");
        std::env::set_var("CUVS_PROCESSING_SERVICE_KEYS", "consultas, medicamentos");

        let config = parse_config("").unwrap();

        std::env::remove_var("CUVS_OUTPUT_COMPRESSION_LEVEL");
        std::env::remove_var("CUVS_PROCESSING_SERVICE_KEYS");

        assert_eq!(config.output.compression_level, 3);
        assert_eq!(
            config.processing.service_keys,
            vec!["consultas", "medicamentos"]
        );
    }

    #[test]
    fn test_invalid_env_override_is_an_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("CUVS_OUTPUT_OVERWRITE", "maybe");
        let result = parse_config("");
        std::env::remove_var("CUVS_OUTPUT_OVERWRITE");

        assert!(matches!(result, Err(CuvsError::Configuration(_))));
    }
}
