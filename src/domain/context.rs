//! Error context extension trait
//!
//! Works like `anyhow::Context` but keeps the library on [`CuvsError`].
//!
//! # Examples
//!
//! ```rust
//! use cuvs::domain::Result;
//! use cuvs::domain::context::ResultExt;
//!
//! fn read_batch_file(path: &str) -> Result<Vec<u8>> {
//!     std::fs::read(path).with_context(|| format!("Failed to read {path}"))
//! }
//! ```

use crate::domain::errors::CuvsError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// The context is evaluated eagerly; use `.with_context()` when building it
    /// is not free.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error, computing it only on failure
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<CuvsError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| wrap(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| wrap(e.into(), f()))
    }
}

// The variant is preserved; only the message grows.
fn wrap(error: CuvsError, context: impl std::fmt::Display) -> CuvsError {
    match error {
        CuvsError::Configuration(msg) => CuvsError::Configuration(format!("{context}: {msg}")),
        CuvsError::JsonParse(msg) => CuvsError::JsonParse(format!("{context}: {msg}")),
        CuvsError::ArchiveBuild(msg) => CuvsError::ArchiveBuild(format!("{context}: {msg}")),
        CuvsError::Workbook(msg) => CuvsError::Workbook(format!("{context}: {msg}")),
        CuvsError::Validation(msg) => CuvsError::Validation(format!("{context}: {msg}")),
        CuvsError::Serialization(msg) => CuvsError::Serialization(format!("{context}: {msg}")),
        CuvsError::Io(msg) => CuvsError::Io(format!("{context}: {msg}")),
    }
}
