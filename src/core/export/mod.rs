//! Output assembly and run orchestration
//!
//! This module provides the output side of the engine:
//! - In-memory archive and ZIP serialization
//! - Archive assembly for the renaming and Excel pipelines
//! - Run coordination and summary reporting

pub mod archive;
pub mod assembler;
pub mod coordinator;
pub mod summary;

pub use archive::{OutputArchive, DEFAULT_COMPRESSION_LEVEL};
pub use assembler::{assemble, assemble_workbooks, Assembly};
pub use coordinator::{BatchCoordinator, EngineSettings, RunOutcome, RunReport};
pub use summary::{FileIssue, RunStats, RunSummary};
