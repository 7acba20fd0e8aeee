//! Disk batch loader
//!
//! Reads the files named on the command line into memory. This is the collaborator
//! side of the engine boundary: once the batch is loaded nothing else touches the disk.

use crate::domain::{CuvsError, FileEntry, GroupingMode, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files read from disk plus the grouping mode their layout suggests
#[derive(Debug, Clone)]
pub struct LoadedBatch {
    /// Files in walk order (sorted by name within each directory)
    pub files: Vec<FileEntry>,

    /// `Tree` when any input was a directory, `Flat` for loose files only
    pub suggested_mode: GroupingMode,
}

impl LoadedBatch {
    /// Total size of all loaded files in bytes
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content().len()).sum()
    }
}

/// Loads a batch from a list of paths
///
/// - A single directory is the batch root: its sub-folders become the groups.
/// - Several directories each contribute one group named after the directory.
/// - Plain files are added by name only.
///
/// # Errors
///
/// Returns an error if a path does not exist or a file cannot be read.
pub fn load_batch(inputs: &[PathBuf]) -> Result<LoadedBatch> {
    if inputs.is_empty() {
        return Err(CuvsError::Validation("No input paths given".to_string()));
    }

    let directories = inputs.iter().filter(|p| p.is_dir()).count();
    let mut files = Vec::new();

    for input in inputs {
        if !input.exists() {
            return Err(CuvsError::Io(format!(
                "Input path not found: {}",
                input.display()
            )));
        }

        if input.is_dir() {
            // A lone directory is the batch root; otherwise the directory itself is a group
            let base = if directories == 1 {
                input.as_path()
            } else {
                input.parent().unwrap_or(input.as_path())
            };
            read_directory(input, base, &mut files)?;
        } else {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| {
                    CuvsError::Io(format!("Invalid input file name: {}", input.display()))
                })?;
            files.push(FileEntry::new(name, std::fs::read(input)?));
        }
    }

    let suggested_mode = if directories > 0 {
        GroupingMode::Tree
    } else {
        GroupingMode::Flat
    };

    tracing::info!(
        inputs = inputs.len(),
        files = files.len(),
        mode = %suggested_mode,
        "Loaded batch from disk"
    );

    Ok(LoadedBatch {
        files,
        suggested_mode,
    })
}

fn read_directory(root: &Path, base: &Path, files: &mut Vec<FileEntry>) -> Result<()> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(base)
            .map_err(|e| CuvsError::Io(format!("{}: {e}", entry.path().display())))?;
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let content = std::fs::read(entry.path())?;
        files.push(FileEntry::new(relative, content));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_single_directory_is_batch_root() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("70-1/b.xml"), "<b/>");
        write(&dir.path().join("70-1/a.json"), "{}");
        write(&dir.path().join("71-2/c.xml"), "<c/>");

        let batch = load_batch(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(batch.suggested_mode, GroupingMode::Tree);
        let paths: Vec<&str> = batch.files.iter().map(|f| f.relative_path()).collect();
        assert_eq!(paths, vec!["70-1/a.json", "70-1/b.xml", "71-2/c.xml"]);
        assert_eq!(batch.total_bytes(), 10);
    }

    #[test]
    fn test_multiple_directories_become_groups() {
        let parent = TempDir::new().unwrap();
        write(&parent.path().join("70-1/a.json"), "{}");
        write(&parent.path().join("71-2/b.xml"), "<b/>");

        let batch = load_batch(&[
            parent.path().join("70-1"),
            parent.path().join("71-2"),
        ])
        .unwrap();

        let paths: Vec<&str> = batch.files.iter().map(|f| f.relative_path()).collect();
        assert_eq!(paths, vec!["70-1/a.json", "71-2/b.xml"]);
    }

    #[test]
    fn test_loose_files_suggest_flat_mode() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("report.json");
        write(&file, "{}");

        let batch = load_batch(&[file]).unwrap();

        assert_eq!(batch.suggested_mode, GroupingMode::Flat);
        assert_eq!(batch.files[0].relative_path(), "report.json");
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let result = load_batch(&[PathBuf::from("/nonexistent/cuvs/input")]);
        assert!(matches!(result, Err(CuvsError::Io(_))));
    }

    #[test]
    fn test_no_inputs_is_an_error() {
        assert!(load_batch(&[]).is_err());
    }
}
