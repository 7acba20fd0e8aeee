//! Process command implementation
//!
//! This module implements the `process` command: load a batch from disk, run one
//! operation on a blocking task and write the resulting archive.

use crate::config::{load_config_or_default, CuvsConfig, ProcessingConfig};
use crate::core::export::{BatchCoordinator, RunOutcome, RunSummary};
use crate::core::ingest::load_batch;
use crate::domain::{GroupingMode, Operation, ResultExt};
use crate::log_error_with_context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::watch;

/// Maximum number of file issues printed after a run
const MAX_PRINTED_ISSUES: usize = 10;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Operation to run (sos, otras-eps, coosalud, pdf, excel)
    pub profile: String,

    /// Batch directory, claim folders or individual files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Override grouping mode (tree or flat)
    #[arg(long)]
    pub mode: Option<String>,

    /// Override output directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Dry run mode - process the batch without writing the archive
    #[arg(long)]
    pub dry_run: bool,
}

impl ProcessArgs {
    /// Execute the process command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(profile = %self.profile, "Starting process command");

        let operation = match Operation::from_str(&self.profile) {
            Ok(op) => op,
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if let Some(output) = &self.output {
            tracing::info!(directory = %output, "Overriding output directory from CLI");
            config.output.directory = output.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        let target = output_path(&config, operation);
        if !config.application.dry_run && target.exists() && !config.output.overwrite {
            eprintln!(
                "Output already exists: {} (set output.overwrite = true to replace it)",
                target.display()
            );
            return Ok(2);
        }

        let batch = match load_batch(&self.inputs) {
            Ok(b) => b,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load batch");
                eprintln!("Failed to read input: {e}");
                return Ok(5);
            }
        };

        let mode = match resolve_mode(
            self.mode.as_deref(),
            &config.processing,
            batch.suggested_mode,
        ) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("{e}");
                return Ok(2);
            }
        };

        tracing::debug!(
            files = batch.files.len(),
            bytes = batch.total_bytes(),
            mode = %mode,
            "Batch loaded"
        );

        if config.application.dry_run {
            println!("🔍 DRY RUN MODE - the archive will not be written");
            println!();
        }

        let coordinator = BatchCoordinator::from_config(&config);
        let files = batch.files;
        let task =
            tokio::task::spawn_blocking(move || coordinator.run(operation, files, mode));

        let mut shutdown_signal = shutdown_signal;
        let outcome = tokio::select! {
            joined = task => joined?,
            _ = wait_for_shutdown(&mut shutdown_signal) => {
                tracing::info!("Run interrupted by user signal");
                println!("⚠️  Run interrupted, no archive was written.");
                return Ok(130);
            }
            _ = deadline(config.processing.timeout()) => {
                tracing::error!(
                    timeout_secs = config.processing.timeout_secs,
                    "Run timed out"
                );
                eprintln!(
                    "Run timed out after {}s, no archive was written",
                    config.processing.timeout_secs
                );
                return Ok(5);
            }
        };

        let outcome = match outcome {
            Ok(o) => o,
            Err(e) => {
                log_error_with_context!(&e, "Run failed");
                eprintln!("Processing failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        match outcome {
            RunOutcome::NothingToDo(summary) => {
                summary.log_summary();
                println!("{}", operation.empty_message());
                print_issues(&summary);
                Ok(1)
            }
            RunOutcome::Completed(report) => {
                report.summary.log_summary();

                if config.application.dry_run {
                    println!(
                        "Would write {} ({} bytes)",
                        target.display(),
                        report.archive_bytes.len()
                    );
                } else if let Err(e) = write_archive(&target, &report.archive_bytes) {
                    log_error_with_context!(&e, "Failed to write archive");
                    eprintln!("Failed to write archive: {e}");
                    return Ok(5);
                } else {
                    println!("📦 {}", target.display());
                }

                println!();
                println!("✅ {}", operation.success_title());
                for line in report.summary.report_lines() {
                    println!("  {line}");
                }
                println!(
                    "  Duración: {:.2}s",
                    report.summary.duration.as_secs_f64()
                );
                print_issues(&report.summary);
                Ok(0)
            }
        }
    }
}

/// Picks the grouping mode: CLI flag, then configured mode, then what the input suggests
fn resolve_mode(
    cli_mode: Option<&str>,
    processing: &ProcessingConfig,
    suggested: GroupingMode,
) -> crate::domain::Result<GroupingMode> {
    match cli_mode {
        Some(mode) => GroupingMode::from_str(mode),
        None => Ok(processing.grouping_mode().unwrap_or(suggested)),
    }
}

fn output_path(config: &CuvsConfig, operation: Operation) -> PathBuf {
    Path::new(&config.output.directory).join(operation.artifact_name())
}

fn write_archive(path: &Path, bytes: &[u8]) -> crate::domain::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Archive written");
    Ok(())
}

fn print_issues(summary: &RunSummary) {
    if summary.issues.is_empty() {
        return;
    }

    println!();
    println!("⚠️  Archivos con errores:");
    for issue in summary.issues.iter().take(MAX_PRINTED_ISSUES) {
        println!("  - {} ({}): {}", issue.file, issue.group, issue.message);
    }
    if summary.issues.len() > MAX_PRINTED_ISSUES {
        println!(
            "  ... and {} more",
            summary.issues.len() - MAX_PRINTED_ISSUES
        );
    }
}

async fn wait_for_shutdown(signal: &mut watch::Receiver<bool>) {
    while !*signal.borrow() {
        if signal.changed().await.is_err() {
            // Sender gone: no signal can arrive any more
            std::future::pending::<()>().await;
        }
    }
}

async fn deadline(timeout: Option<Duration>) {
    match timeout {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending::<()>().await,
    }
}
