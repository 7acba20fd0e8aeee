//! In-memory output archive
//!
//! An [`OutputArchive`] is an ordered `path -> bytes` mapping that serializes to a ZIP
//! file. Entries keep insertion order (group, then file) so the same batch always
//! produces the same archive layout.

use crate::domain::{CuvsError, Result};
use indexmap::IndexMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// DEFLATE level used when none is configured
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;

/// Ordered mapping of archive paths to file contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputArchive {
    entries: IndexMap<String, Vec<u8>>,
}

impl OutputArchive {
    /// Creates an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry; a later write to the same path replaces the earlier content
    pub fn insert(&mut self, path: impl Into<String>, content: Vec<u8>) -> Option<Vec<u8>> {
        let path = path.into();
        let previous = self.entries.insert(path.clone(), content);
        if previous.is_some() {
            tracing::debug!(path = %path, "Archive entry overwritten");
        }
        previous
    }

    /// Content of one entry
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    /// Entry paths in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of uncompressed entry sizes
    pub fn total_bytes(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Serializes the archive as ZIP bytes
    ///
    /// Level `0` stores entries uncompressed; `1..=9` uses DEFLATE at that level.
    ///
    /// # Errors
    ///
    /// Returns [`CuvsError::ArchiveBuild`] if the level is out of range or the ZIP
    /// writer fails.
    pub fn to_zip_bytes(&self, compression_level: u32) -> Result<Vec<u8>> {
        let options = file_options(compression_level)?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for (path, content) in &self.entries {
            writer.start_file(path.as_str(), options)?;
            writer
                .write_all(content)
                .map_err(|e| CuvsError::ArchiveBuild(format!("{path}: {e}")))?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

fn file_options(compression_level: u32) -> Result<SimpleFileOptions> {
    match compression_level {
        0 => Ok(SimpleFileOptions::default().compression_method(CompressionMethod::Stored)),
        1..=9 => Ok(SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(compression_level)))),
        _ => Err(CuvsError::ArchiveBuild(format!(
            "Invalid compression level {compression_level}, expected 0-9"
        ))),
    }
}
