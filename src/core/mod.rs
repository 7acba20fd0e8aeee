//! Core business logic for CUVS.
//!
//! This module contains the batch transformation engine.
//!
//! # Modules
//!
//! - [`ingest`] - Disk loading and folder grouping
//! - [`transform`] - Renaming, CUV normalization and tabular flattening
//! - [`export`] - Archive assembly, ZIP serialization and run coordination
//!
//! # Workflow
//!
//! 1. **Load**: Read the batch into memory as [`FileEntry`](crate::domain::FileEntry) values
//! 2. **Group**: Filter by extension and partition into claim folders
//! 3. **Transform**: Rename and normalize each file, or flatten it into sheets
//! 4. **Assemble**: Collect the results into one archive (nested ZIPs for PDFs)
//! 5. **Report**: Summarize counters and per-file issues
//!
//! # Example
//!
//! ```rust
//! use cuvs::core::export::{BatchCoordinator, RunOutcome};
//! use cuvs::domain::{FileEntry, GroupingMode, Operation};
//!
//! # fn example() -> cuvs::domain::Result<()> {
//! let files = vec![
//!     FileEntry::new("70-1372772-001/ResultadosMSPS_abc.json", b"{}".to_vec()),
//!     FileEntry::new("70-1372772-001/notes.xml", b"<notes/>".to_vec()),
//! ];
//!
//! let coordinator = BatchCoordinator::default();
//! match coordinator.run(Operation::Sos, files, GroupingMode::Tree)? {
//!     RunOutcome::Completed(report) => {
//!         println!("{}: {} bytes", report.artifact_name, report.archive_bytes.len());
//!     }
//!     RunOutcome::NothingToDo(_) => println!("{}", Operation::Sos.empty_message()),
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod export;
pub mod ingest;
pub mod transform;
