//! Batch coordinator - runs one operation end to end
//!
//! Groups the batch, dispatches to the renaming or flattening pipeline, serializes the
//! output archive and reports whether there was anything to do.

use super::archive::OutputArchive;
use super::assembler::{assemble, assemble_workbooks, Assembly};
use super::summary::RunSummary;
use crate::config::CuvsConfig;
use crate::core::ingest::group_files;
use crate::core::transform::normalize::{CuvNormalizer, Normalizer};
use crate::core::transform::rename::{Renamer, RuleRenamer};
use crate::domain::{FileEntry, GroupingMode, Operation, Result};
use std::time::Instant;

/// Engine settings taken from the configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// DEFLATE level for outer and inner archives
    pub compression_level: u32,

    /// Service keys for the Excel conversion
    pub service_keys: Vec<String>,

    /// Prefix of the `RutaArchivos` value
    pub ruta_archivos_prefix: String,
}

impl EngineSettings {
    /// Extracts the engine settings from a configuration
    pub fn from_config(config: &CuvsConfig) -> Self {
        Self {
            compression_level: config.output.compression_level,
            service_keys: config.processing.service_keys.clone(),
            ruta_archivos_prefix: config.normalization.ruta_archivos_prefix.clone(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&CuvsConfig::default())
    }
}

/// Serialized output of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Conventional file name of the archive
    pub artifact_name: String,

    /// ZIP bytes
    pub archive_bytes: Vec<u8>,

    /// Counters and issues
    pub summary: RunSummary,
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The archive was built
    Completed(RunReport),

    /// Nothing qualified after filtering
    NothingToDo(RunSummary),
}

impl RunOutcome {
    /// Summary of the run, whatever the outcome
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunOutcome::Completed(report) => &report.summary,
            RunOutcome::NothingToDo(summary) => summary,
        }
    }

    /// Whether the run found nothing to process
    pub fn is_nothing_to_do(&self) -> bool {
        matches!(self, RunOutcome::NothingToDo(_))
    }
}

/// Batch coordinator
pub struct BatchCoordinator {
    settings: EngineSettings,
    renamer: Box<dyn Renamer + Send + Sync>,
    normalizer: Box<dyn Normalizer + Send + Sync>,
}

impl BatchCoordinator {
    /// Create a coordinator with the rule-based renamer and CUV normalizer
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            renamer: Box::new(RuleRenamer),
            normalizer: Box::new(CuvNormalizer),
        }
    }

    /// Create a coordinator from a configuration
    pub fn from_config(config: &CuvsConfig) -> Self {
        Self::new(EngineSettings::from_config(config))
    }

    /// Replace the renamer
    pub fn with_renamer(mut self, renamer: impl Renamer + Send + Sync + 'static) -> Self {
        self.renamer = Box::new(renamer);
        self
    }

    /// Runs one operation over an already loaded batch
    ///
    /// # Errors
    ///
    /// Returns [`CuvsError::ArchiveBuild`](crate::domain::CuvsError::ArchiveBuild) when
    /// the output archive cannot be serialized. Per-file failures never fail the run;
    /// they are listed in the summary.
    pub fn run(
        &self,
        operation: Operation,
        files: Vec<FileEntry>,
        mode: GroupingMode,
    ) -> Result<RunOutcome> {
        let start_time = Instant::now();
        let mut summary = RunSummary::new(operation);

        crate::log_run_start!(operation, mode, files.len());

        let groups = group_files(files, mode, Some(operation.extension_filter()));
        if groups.is_empty() {
            tracing::info!(operation = %operation, "No groups qualified after filtering");
            return Ok(RunOutcome::NothingToDo(
                summary.with_duration(start_time.elapsed()),
            ));
        }

        let assembly = match operation.profile() {
            Some(profile) => {
                let profile = profile.with_ruta_archivos_prefix(&self.settings.ruta_archivos_prefix);
                assemble(
                    &groups,
                    &profile,
                    self.renamer.as_ref(),
                    self.normalizer.as_ref(),
                    self.settings.compression_level,
                )?
            }
            None => assemble_workbooks(&groups, &self.settings.service_keys),
        };

        let Assembly {
            archive,
            stats,
            issues,
        } = assembly;
        summary.stats = stats;
        summary.issues = issues;

        if archive.is_empty() || !summary.stats.produced_output() {
            return Ok(RunOutcome::NothingToDo(
                summary.with_duration(start_time.elapsed()),
            ));
        }

        let archive_bytes = self.serialize(&archive)?;
        summary.entries_written = archive.len();
        crate::log_run_complete!(operation, archive.len(), start_time.elapsed());

        Ok(RunOutcome::Completed(RunReport {
            artifact_name: operation.artifact_name().to_string(),
            archive_bytes,
            summary: summary.with_duration(start_time.elapsed()),
        }))
    }

    fn serialize(&self, archive: &OutputArchive) -> Result<Vec<u8>> {
        let bytes = archive
            .to_zip_bytes(self.settings.compression_level)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to build output archive"))?;

        tracing::debug!(
            entries = archive.len(),
            uncompressed_bytes = archive.total_bytes(),
            compressed_bytes = bytes.len(),
            "Serialized output archive"
        );

        Ok(bytes)
    }
}

impl Default for BatchCoordinator {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
