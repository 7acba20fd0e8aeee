//! Folder grouping
//!
//! Partitions a batch into claim folders. In tree mode the first path segment below
//! the batch root names the group; in flat mode everything goes to one virtual group.

use crate::domain::{FileEntry, FolderGroups, GroupingMode, VIRTUAL_GROUP_NAME};

/// Groups files by claim folder
///
/// Files are first filtered by `extension_filter` (lower-cased suffix match, any entry
/// matches). In [`GroupingMode::Tree`] a file with fewer than two path segments cannot
/// be attributed to a folder and is dropped.
///
/// # Examples
///
/// ```
/// use cuvs::core::ingest::group_files;
/// use cuvs::domain::{FileEntry, GroupingMode};
///
/// let files = vec![
///     FileEntry::new("70-1372772-001/notes.xml", vec![]),
///     FileEntry::new("70-1372772-001/factura.pdf", vec![]),
///     FileEntry::new("suelto.xml", vec![]),
/// ];
///
/// let groups = group_files(files, GroupingMode::Tree, Some(&[".json", ".xml"][..]));
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups.get("70-1372772-001").unwrap().len(), 1);
/// ```
pub fn group_files(
    files: impl IntoIterator<Item = FileEntry>,
    mode: GroupingMode,
    extension_filter: Option<&[&str]>,
) -> FolderGroups {
    let mut groups = FolderGroups::new();
    let mut dropped = 0usize;

    for file in files {
        if let Some(filter) = extension_filter {
            if !filter.iter().any(|ext| file.has_extension(ext)) {
                continue;
            }
        }

        match mode {
            GroupingMode::Tree => {
                let folder = {
                    let mut segments = file.segments();
                    match (segments.next(), segments.next()) {
                        (Some(folder), Some(_)) => Some(folder.to_string()),
                        _ => None,
                    }
                };
                match folder {
                    Some(folder) => groups.push(folder, file),
                    None => {
                        tracing::debug!(
                            file = %file.relative_path(),
                            "File is not inside a folder, skipping"
                        );
                        dropped += 1;
                    }
                }
            }
            GroupingMode::Flat => groups.push(VIRTUAL_GROUP_NAME, file),
        }
    }

    tracing::debug!(
        mode = %mode,
        groups = groups.len(),
        files = groups.file_count(),
        dropped,
        "Grouped batch files"
    );

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> FileEntry {
        FileEntry::new(path, Vec::new())
    }

    #[test]
    fn test_tree_mode_groups_by_first_segment() {
        let files = vec![
            entry("70-1/a.json"),
            entry("71-2/b.xml"),
            entry("70-1/sub/c.xml"),
        ];

        let groups = group_files(files, GroupingMode::Tree, None);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get("70-1").unwrap().len(), 2);
        assert_eq!(groups.get("71-2").unwrap().len(), 1);
        let names: Vec<&str> = groups.names().collect();
        assert_eq!(names, vec!["70-1", "71-2"]);
    }

    #[test]
    fn test_tree_mode_drops_root_level_files() {
        let groups = group_files(vec![entry("loose.json")], GroupingMode::Tree, None);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_flat_mode_uses_virtual_group() {
        let files = vec![entry("a.json"), entry("folder/b.xml")];
        let groups = group_files(files, GroupingMode::Flat, None);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups.get(VIRTUAL_GROUP_NAME).unwrap().len(), 2);
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        let files = vec![
            entry("g/A.PDF"),
            entry("g/b.pdf"),
            entry("g/c.json"),
            entry("g/pdf"),
        ];
        let groups = group_files(files, GroupingMode::Tree, Some(&[".pdf"][..]));

        let kept: Vec<&str> = groups.get("g").unwrap().iter().map(|f| f.name()).collect();
        assert_eq!(kept, vec!["A.PDF", "b.pdf"]);
    }

    #[test]
    fn test_empty_input_yields_empty_groups() {
        let groups = group_files(Vec::new(), GroupingMode::Tree, None);
        assert!(groups.is_empty());
        assert_eq!(groups.file_count(), 0);
    }

    #[test]
    fn test_filter_removing_everything_yields_no_groups() {
        let groups = group_files(vec![entry("g/a.txt")], GroupingMode::Flat, Some(&[".json"][..]));
        assert!(groups.is_empty());
    }
}
