//! Per-file transformation logic
//!
//! Two independent pipelines consume the grouped batch:
//!
//! - **Renaming** ([`rename`] then [`normalize`]): computes the destination name of each
//!   file and rewrites CUV payloads
//! - **Flattening** ([`flatten`] then [`workbook`]): turns a RIPS payload into sheets and
//!   renders them as `.xlsx`
//!
//! Nothing here performs I/O or fails the batch; per-file problems come back as
//! [`FileError`](crate::domain::FileError) values.

pub mod flatten;
pub mod normalize;
pub mod rename;
pub mod workbook;

pub use flatten::{
    flatten_document, flatten_file, FlattenedWorkbook, Table, DEFAULT_SERVICE_KEYS,
};
pub use normalize::{normalize_cuv, CuvNormalizer, NormalizeOutcome, Normalizer};
pub use rename::{rename_file, Renamer, RuleRenamer};
pub use workbook::render_workbook;
