//! Domain models and types for CUVS.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Batch input** ([`FileEntry`], [`FolderGroups`], [`GroupingMode`])
//! - **Processing profiles** ([`ProcessingProfile`], [`Operation`])
//! - **Error types** ([`CuvsError`], [`FileError`])
//! - **Result type alias** ([`Result`])
//!
//! # Profiles as data
//!
//! ```rust
//! use cuvs::domain::{Operation, ProcessingProfile};
//!
//! let profile = Operation::Coosalud.profile().unwrap();
//! assert_eq!(profile, ProcessingProfile::coosalud());
//! assert_eq!(profile.suffix_to_strip, "-001");
//! ```

pub mod batch;
pub mod context;
pub mod errors;
pub mod profile;
pub mod result;

// Re-export commonly used types for convenience
pub use batch::{FileEntry, FolderGroups, GroupingMode, VIRTUAL_GROUP_NAME};
pub use context::ResultExt;
pub use errors::{CuvsError, FileError, FileErrorKind};
pub use profile::{
    ArchiveLayout, CuvDefaults, Operation, ProcessingProfile, RenameRule, RutaArchivosSource,
    CUV_JSON_SUFFIX, CUV_SOURCE_MARKER, DEFAULT_RUTA_ARCHIVOS_PREFIX,
};
pub use result::Result;
