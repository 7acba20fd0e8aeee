//! Configuration management for CUVS.
//!
//! # Overview
//!
//! CUVS reads an optional TOML file (`cuvs.toml` by default) with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CUVS_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cuvs::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cuvs.toml")?;
//!
//! println!("Output directory: {}", config.output.directory);
//! println!("Compression level: {}", config.output.compression_level);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry run
//! - [`ProcessingConfig`] - Grouping mode, timeout, Excel service keys
//! - [`OutputConfig`] - Output directory, compression, overwrite
//! - [`NormalizationConfig`] - `RutaArchivos` prefix
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [processing]
//! default_mode = "auto"
//! timeout_secs = 300
//!
//! [output]
//! directory = "${CUVS_OUTPUT_DIR}"
//! compression_level = 9
//!
//! [normalization]
//! ruta_archivos_prefix = 'C:\Users\'
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, parse_config};
pub use schema::{
    ApplicationConfig, CuvsConfig, LoggingConfig, NormalizationConfig, OutputConfig,
    ProcessingConfig,
};
