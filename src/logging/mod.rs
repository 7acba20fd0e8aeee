//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output on stderr
//! - Configurable log levels
//! - JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use cuvs::logging::init_logging;
//! use cuvs::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a run
///
/// # Example
///
/// ```no_run
/// use cuvs::log_run_start;
/// use cuvs::domain::{GroupingMode, Operation};
///
/// log_run_start!(Operation::Sos, GroupingMode::Tree, 12);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($operation:expr, $mode:expr, $files:expr) => {
        tracing::info!(
            operation = %$operation,
            mode = %$mode,
            files = $files,
            "Starting run"
        );
    };
}

/// Log the completion of a run
///
/// # Example
///
/// ```no_run
/// use cuvs::log_run_complete;
/// use cuvs::domain::Operation;
/// use std::time::Duration;
///
/// log_run_complete!(Operation::Excel, 3, Duration::from_millis(250));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($operation:expr, $entries:expr, $duration:expr) => {
        tracing::info!(
            operation = %$operation,
            entries = $entries,
            duration_ms = $duration.as_millis(),
            "Run completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cuvs::log_error_with_context;
/// use cuvs::domain::CuvsError;
///
/// let error = CuvsError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
