//! Domain error types
//!
//! This module defines the error hierarchy for CUVS. Fatal errors abort a run and are
//! surfaced as [`CuvsError`]; per-file problems are plain values ([`FileError`]) that
//! the engine records and then keeps going.

use thiserror::Error;

/// Main CUVS error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error sources without exposing third-party types to callers.
#[derive(Debug, Error)]
pub enum CuvsError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed JSON in a file the engine had to read
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// The assembled entries could not be serialized into a ZIP archive
    #[error("Archive build error: {0}")]
    ArchiveBuild(String),

    /// A flattened workbook could not be rendered as `.xlsx`
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Kind of a recoverable, per-file failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileErrorKind {
    /// The file content is not valid JSON
    JsonParse,
    /// The JSON is valid but not the shape the step expects (e.g. not an object)
    UnexpectedShape,
    /// The flattened tables could not be written as a workbook
    Workbook,
}

impl std::fmt::Display for FileErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FileErrorKind::JsonParse => "json_parse",
            FileErrorKind::UnexpectedShape => "unexpected_shape",
            FileErrorKind::Workbook => "workbook",
        };
        f.write_str(label)
    }
}

/// A recoverable failure attached to a single file
///
/// Never aborts sibling processing; the caller logs it and records it in the
/// run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    /// What went wrong
    pub kind: FileErrorKind,

    /// Underlying message
    pub message: String,
}

impl FileError {
    /// Creates a new file error
    pub fn new(kind: FileErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a JSON parse failure
    pub fn json_parse(message: impl Into<String>) -> Self {
        Self::new(FileErrorKind::JsonParse, message)
    }
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl From<FileError> for CuvsError {
    fn from(err: FileError) -> Self {
        match err.kind {
            FileErrorKind::JsonParse | FileErrorKind::UnexpectedShape => {
                CuvsError::JsonParse(err.message)
            }
            FileErrorKind::Workbook => CuvsError::Workbook(err.message),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for CuvsError {
    fn from(err: std::io::Error) -> Self {
        CuvsError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CuvsError {
    fn from(err: serde_json::Error) -> Self {
        CuvsError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CuvsError {
    fn from(err: toml::de::Error) -> Self {
        CuvsError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<zip::result::ZipError> for CuvsError {
    fn from(err: zip::result::ZipError) -> Self {
        CuvsError::ArchiveBuild(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for CuvsError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        CuvsError::Workbook(err.to_string())
    }
}

impl From<walkdir::Error> for CuvsError {
    fn from(err: walkdir::Error) -> Self {
        CuvsError::Io(err.to_string())
    }
}
