//! Batch ingestion
//!
//! - [`loader`] reads files from disk into [`FileEntry`](crate::domain::FileEntry) values
//! - [`grouping`] partitions them into claim folders

pub mod grouping;
pub mod loader;

pub use grouping::group_files;
pub use loader::{load_batch, LoadedBatch};
