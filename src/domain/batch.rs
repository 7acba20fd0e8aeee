//! Batch input model
//!
//! A batch is an ordered list of [`FileEntry`] values handed over by whatever
//! collected the files (a directory walk, an upload buffer). The engine never
//! touches the filesystem itself.

use crate::domain::{CuvsError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the single group used when the batch has no folder structure
pub const VIRTUAL_GROUP_NAME: &str = "archivos_seleccionados";

/// One file of the batch
///
/// Immutable once read. `relative_path` is relative to the batch root and uses `/`
/// as separator; `name` is always its final segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    relative_path: String,
    name: String,
    content: Vec<u8>,
}

impl FileEntry {
    /// Creates a new entry, deriving the name from the last path segment
    ///
    /// Backslashes are treated as separators and leading/trailing slashes are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use cuvs::domain::FileEntry;
    ///
    /// let entry = FileEntry::new("70-1372772-001\\notes.xml", b"<x/>".to_vec());
    /// assert_eq!(entry.relative_path(), "70-1372772-001/notes.xml");
    /// assert_eq!(entry.name(), "notes.xml");
    /// ```
    pub fn new(relative_path: impl Into<String>, content: Vec<u8>) -> Self {
        let relative_path = relative_path
            .into()
            .replace('\\', "/")
            .trim_matches('/')
            .to_string();
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        Self {
            relative_path,
            name,
            content,
        }
    }

    /// Path relative to the batch root
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// File name (final path segment)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw file bytes
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Path segments of the relative path
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.relative_path.split('/').filter(|s| !s.is_empty())
    }

    /// Directory part of the relative path, if any
    pub fn parent(&self) -> Option<&str> {
        self.relative_path
            .rsplit_once('/')
            .map(|(parent, _)| parent)
    }

    /// Lower-cased extension check, e.g. `has_extension(".pdf")`
    pub fn has_extension(&self, extension: &str) -> bool {
        self.name
            .to_lowercase()
            .ends_with(&extension.to_lowercase())
    }
}

/// How files are attributed to groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    /// First path segment below the batch root names the group
    #[default]
    Tree,
    /// Every file lands in [`VIRTUAL_GROUP_NAME`]
    Flat,
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingMode::Tree => f.write_str("tree"),
            GroupingMode::Flat => f.write_str("flat"),
        }
    }
}

impl FromStr for GroupingMode {
    type Err = CuvsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tree" | "folder" | "folders" => Ok(Self::Tree),
            "flat" | "files" => Ok(Self::Flat),
            _ => Err(CuvsError::Configuration(format!(
                "Invalid grouping mode: {s}. Expected 'tree' or 'flat'"
            ))),
        }
    }
}

/// Files partitioned by group name, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderGroups {
    groups: IndexMap<String, Vec<FileEntry>>,
}

impl FolderGroups {
    /// Creates an empty grouping
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a file to a group, creating the group on first use
    pub fn push(&mut self, group: impl Into<String>, entry: FileEntry) {
        self.groups.entry(group.into()).or_default().push(entry);
    }

    /// Files of one group
    pub fn get(&self, group: &str) -> Option<&[FileEntry]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// Iterates groups in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FileEntry])> {
        self.groups
            .iter()
            .map(|(name, files)| (name.as_str(), files.as_slice()))
    }

    /// Group names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of files across all groups
    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
