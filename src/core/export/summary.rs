//! Run statistics and reporting
//!
//! This module defines structures for tracking and reporting the result of one
//! engine invocation.

use crate::domain::{FileError, FileErrorKind, Operation};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Counters accumulated over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Groups that contributed to the output
    pub groups_processed: usize,

    /// Files whose output name differs from the input name
    pub files_renamed: usize,

    /// CUV payloads parsed and rewritten
    pub json_normalized: usize,

    /// Inner archives built (PDF compression)
    pub archives_assembled: usize,

    /// Source files read by the flattener
    pub files_processed: usize,

    /// Workbooks written (Excel conversion)
    pub workbooks_converted: usize,

    /// Parsed files without a `usuarios` array
    pub skipped_no_usuarios: usize,

    /// Files that hit a recoverable error
    pub failed_files: usize,
}

impl RunStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the run produced any output entry
    pub fn produced_output(&self) -> bool {
        self.groups_processed > 0 || self.workbooks_converted > 0
    }
}

/// A recoverable failure with enough context to diagnose it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIssue {
    /// What went wrong
    pub kind: FileErrorKind,

    /// Relative path of the file in the batch
    pub file: String,

    /// Group the file belongs to
    pub group: String,

    /// Profile that was running
    pub profile: Operation,

    /// Underlying message
    pub message: String,
}

impl FileIssue {
    /// Attaches batch context to a [`FileError`]
    pub fn new(
        error: FileError,
        file: impl Into<String>,
        group: impl Into<String>,
        profile: Operation,
    ) -> Self {
        Self {
            kind: error.kind,
            file: file.into(),
            group: group.into(),
            profile,
            message: error.message,
        }
    }

    /// Logs the issue as a warning
    pub fn log(&self) {
        tracing::warn!(
            kind = %self.kind,
            file = %self.file,
            group = %self.group,
            profile = %self.profile,
            error = %self.message,
            "File processed with errors"
        );
    }
}

/// Summary of one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Operation that was run
    pub operation: Operation,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Counters
    pub stats: RunStats,

    /// Entries in the output archive
    pub entries_written: usize,

    /// Duration of the run
    pub duration: Duration,

    /// Recoverable failures, in processing order
    pub issues: Vec<FileIssue>,
}

impl RunSummary {
    /// Create a new empty summary
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            started_at: Utc::now(),
            stats: RunStats::new(),
            entries_written: 0,
            duration: Duration::from_secs(0),
            issues: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the run had no recoverable failures
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.stats.failed_files == 0
    }

    /// Human-readable lines for the end-of-run report
    pub fn report_lines(&self) -> Vec<String> {
        let stats = &self.stats;
        match self.operation {
            Operation::Pdf => vec![
                format!("Carpetas procesadas: {}", stats.groups_processed),
                format!("Archivos ZIP creados: {}", stats.archives_assembled),
            ],
            Operation::Excel => vec![
                format!("Archivos leídos: {}", stats.files_processed),
                format!("Archivos convertidos: {}", stats.workbooks_converted),
                format!("Sin usuarios: {}", stats.skipped_no_usuarios),
                format!("Con errores: {}", stats.failed_files),
            ],
            Operation::Sos | Operation::OtrasEps | Operation::Coosalud => vec![
                format!("Carpetas procesadas: {}", stats.groups_processed),
                format!("Archivos renombrados: {}", stats.files_renamed),
                format!("JSON normalizados: {}", stats.json_normalized),
            ],
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            operation = %self.operation,
            started_at = %self.started_at.to_rfc3339(),
            groups_processed = self.stats.groups_processed,
            files_renamed = self.stats.files_renamed,
            json_normalized = self.stats.json_normalized,
            archives_assembled = self.stats.archives_assembled,
            workbooks_converted = self.stats.workbooks_converted,
            skipped_no_usuarios = self.stats.skipped_no_usuarios,
            failed_files = self.stats.failed_files,
            entries_written = self.entries_written,
            duration_ms = self.duration.as_millis() as u64,
            "Run completed"
        );

        if !self.is_clean() {
            tracing::warn!(
                issue_count = self.issues.len(),
                "Run completed with file errors"
            );
        }
    }
}
