// CUVS - RIPS/CUV Batch Transformation Tool
// Copyright (c) 2025 CUVS Contributors
// Licensed under the MIT License

//! # CUVS - RIPS/CUV batch transformation
//!
//! CUVS repackages batches of clinical-billing claim folders (RIPS JSON, electronic
//! invoice XML, validation results, PDFs) into the archives insurer portals expect.
//!
//! ## Overview
//!
//! One run takes an in-memory batch and one operation and produces a single ZIP:
//! - **SOS / Otras EPS / Coosalud**: rename each folder's files by profile rules and
//!   normalize the CUV validation JSON
//! - **PDF compression**: one nested ZIP per claim folder
//! - **Excel**: flatten RIPS JSON into one `.xlsx` workbook per file
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Engine (ingest, transform, export)
//! - [`domain`] - Batch types, processing profiles and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cuvs::config::load_config_or_default;
//! use cuvs::core::export::{BatchCoordinator, RunOutcome};
//! use cuvs::core::ingest::load_batch;
//! use cuvs::domain::Operation;
//! use std::path::PathBuf;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default("cuvs.toml")?;
//!     let batch = load_batch(&[PathBuf::from("lote_marzo")])?;
//!
//!     let coordinator = BatchCoordinator::from_config(&config);
//!     match coordinator.run(Operation::OtrasEps, batch.files, batch.suggested_mode)? {
//!         RunOutcome::Completed(report) => {
//!             std::fs::write(&report.artifact_name, &report.archive_bytes)?;
//!         }
//!         RunOutcome::NothingToDo(_) => println!("{}", Operation::OtrasEps.empty_message()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fatal problems are [`domain::CuvsError`] values. A malformed file never aborts a
//! run: it passes through unchanged and is listed in the run summary as a
//! [`core::export::FileIssue`].

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
