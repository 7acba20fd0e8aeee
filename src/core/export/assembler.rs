//! Archive assembly
//!
//! Walks the grouped batch, pushes every file through the renamer and normalizer and
//! collects the results into one [`OutputArchive`]. Per-file failures degrade to
//! pass-through; only serializing an inner archive can fail the run.

use super::archive::OutputArchive;
use super::summary::{FileIssue, RunStats};
use crate::core::transform::flatten::flatten_file;
use crate::core::transform::normalize::{is_cuv_json, Normalizer};
use crate::core::transform::rename::Renamer;
use crate::core::transform::workbook::render_workbook;
use crate::domain::{
    ArchiveLayout, FileEntry, FileError, FileErrorKind, FolderGroups, Operation,
    ProcessingProfile, Result,
};

/// Output of one assembly pass
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// Entries to serialize
    pub archive: OutputArchive,

    /// Counters
    pub stats: RunStats,

    /// Recoverable failures
    pub issues: Vec<FileIssue>,
}

impl Assembly {
    fn record(&mut self, issue: FileIssue) {
        issue.log();
        self.stats.failed_files += 1;
        self.issues.push(issue);
    }
}

/// Builds the output archive of a renaming profile
///
/// In [`ArchiveLayout::Flat`] every file lands at its relative path with the final
/// segment renamed. In [`ArchiveLayout::Nested`] each group becomes one inner ZIP at
/// `{group}/{group}.zip` holding the files that pass the profile's extension filter,
/// named by file name only.
///
/// # Errors
///
/// Returns [`CuvsError::ArchiveBuild`](crate::domain::CuvsError::ArchiveBuild) if an
/// inner archive cannot be serialized.
pub fn assemble(
    groups: &FolderGroups,
    profile: &ProcessingProfile,
    renamer: &dyn Renamer,
    normalizer: &dyn Normalizer,
    compression_level: u32,
) -> Result<Assembly> {
    let assembly = match profile.layout {
        ArchiveLayout::Flat => assemble_flat(groups, profile, renamer, normalizer),
        ArchiveLayout::Nested => assemble_nested(groups, profile, compression_level)?,
    };

    tracing::debug!(
        profile = %profile.name(),
        entries = assembly.archive.len(),
        groups_processed = assembly.stats.groups_processed,
        "Assembled output archive"
    );

    Ok(assembly)
}

fn assemble_flat(
    groups: &FolderGroups,
    profile: &ProcessingProfile,
    renamer: &dyn Renamer,
    normalizer: &dyn Normalizer,
) -> Assembly {
    let mut assembly = Assembly::default();

    for (group, files) in groups.iter() {
        if files.is_empty() {
            continue;
        }
        assembly.stats.groups_processed += 1;

        for file in files {
            let renamed = renamer.rename(file.name(), group, profile);
            if renamed != file.name() {
                assembly.stats.files_renamed += 1;
                tracing::debug!(
                    file = %file.relative_path(),
                    renamed = %renamed,
                    group = %group,
                    "Renamed file"
                );
            }

            let path = output_path(file, group, &renamed);

            if !is_cuv_json(&renamed) {
                assembly.archive.insert(path, file.content().to_vec());
                continue;
            }

            let outcome = normalizer.normalize(&renamed, group, file.content(), profile);
            if outcome.was_modified {
                assembly.stats.json_normalized += 1;
            }
            if let Some(error) = outcome.error {
                assembly.record(FileIssue::new(
                    error,
                    file.relative_path(),
                    group,
                    profile.operation,
                ));
            }
            assembly.archive.insert(path, outcome.content);
        }
    }

    assembly
}

fn assemble_nested(
    groups: &FolderGroups,
    profile: &ProcessingProfile,
    compression_level: u32,
) -> Result<Assembly> {
    let filter = profile.operation.extension_filter();
    let mut assembly = Assembly::default();

    for (group, files) in groups.iter() {
        let mut inner = OutputArchive::new();
        for file in files
            .iter()
            .filter(|f| filter.iter().any(|ext| f.has_extension(ext)))
        {
            inner.insert(file.name(), file.content().to_vec());
        }

        if inner.is_empty() {
            tracing::debug!(group = %group, "No qualifying files in group, skipping");
            continue;
        }

        let bytes = inner.to_zip_bytes(compression_level)?;
        tracing::debug!(
            group = %group,
            files = inner.len(),
            bytes = bytes.len(),
            "Built inner archive"
        );

        assembly.archive.insert(format!("{group}/{group}.zip"), bytes);
        assembly.stats.groups_processed += 1;
        assembly.stats.archives_assembled += 1;
    }

    Ok(assembly)
}

/// Builds one workbook per JSON file of the batch
///
/// Workbooks are placed at the archive root under their `.xlsx` name, so two sources
/// with the same file name yield one workbook (the later one). Files that are not
/// valid JSON, or whose workbook cannot be rendered, are skipped and recorded.
pub fn assemble_workbooks<S: AsRef<str>>(groups: &FolderGroups, service_keys: &[S]) -> Assembly {
    let mut assembly = Assembly::default();

    for (group, files) in groups.iter() {
        let converted_before = assembly.stats.workbooks_converted;

        for file in files.iter().filter(|f| f.has_extension(".json")) {
            convert_file(&mut assembly, file, group, service_keys);
        }

        if assembly.stats.workbooks_converted > converted_before {
            assembly.stats.groups_processed += 1;
        }
    }

    tracing::debug!(
        files_processed = assembly.stats.files_processed,
        workbooks = assembly.stats.workbooks_converted,
        skipped_no_usuarios = assembly.stats.skipped_no_usuarios,
        "Assembled workbooks"
    );

    assembly
}

fn convert_file<S: AsRef<str>>(
    assembly: &mut Assembly,
    file: &FileEntry,
    group: &str,
    service_keys: &[S],
) {
    let workbook = match flatten_file(file, service_keys) {
        Ok(workbook) => workbook,
        Err(error) => {
            assembly.record(FileIssue::new(
                error,
                file.relative_path(),
                group,
                Operation::Excel,
            ));
            return;
        }
    };
    assembly.stats.files_processed += 1;

    if !workbook.has_tables() {
        tracing::debug!(file = %file.relative_path(), "No usuarios array, skipping");
        assembly.stats.skipped_no_usuarios += 1;
        return;
    }

    match render_workbook(&workbook) {
        Ok(bytes) => {
            tracing::debug!(
                file = %file.relative_path(),
                sheets = ?workbook.table_names(),
                "Workbook rendered"
            );
            // Workbooks share the archive root; the last file with a given name wins
            if assembly.archive.insert(workbook.output_name.clone(), bytes).is_some() {
                tracing::warn!(
                    file = %file.relative_path(),
                    workbook = %workbook.output_name,
                    "Workbook replaces an earlier one with the same name"
                );
            } else {
                assembly.stats.workbooks_converted += 1;
            }
        }
        Err(e) => assembly.record(FileIssue::new(
            FileError::new(FileErrorKind::Workbook, e.to_string()),
            file.relative_path(),
            group,
            Operation::Excel,
        )),
    }
}

/// Relative path with the final segment replaced by `renamed`
///
/// Files without a folder (flat batches) are placed under the group name.
fn output_path(file: &FileEntry, group: &str, renamed: &str) -> String {
    match file.parent() {
        Some(parent) => format!("{parent}/{renamed}"),
        None => format!("{group}/{renamed}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Reader, Xlsx};
    use crate::core::ingest::group_files;
    use crate::core::transform::normalize::{CuvNormalizer, NormalizeOutcome};
    use crate::core::transform::rename::RuleRenamer;
    use crate::core::transform::DEFAULT_SERVICE_KEYS;
    use crate::domain::{GroupingMode, VIRTUAL_GROUP_NAME};
    use serde_json::Value;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn tree(files: &[(&str, &str)]) -> FolderGroups {
        group_files(
            files
                .iter()
                .map(|(path, content)| FileEntry::new(*path, content.as_bytes().to_vec())),
            GroupingMode::Tree,
            None,
        )
    }

    fn run(groups: &FolderGroups, profile: ProcessingProfile) -> Assembly {
        assemble(groups, &profile, &RuleRenamer, &CuvNormalizer, 9).unwrap()
    }

    #[test]
    fn test_sos_group_end_to_end() {
        let groups = tree(&[
            ("70-1372772-001/ResultadosMSPS_abc.json", "{}"),
            ("70-1372772-001/notes.xml", "<notes/>"),
        ]);

        let assembly = run(&groups, ProcessingProfile::sos());

        let paths: Vec<&str> = assembly.archive.paths().collect();
        assert_eq!(
            paths,
            vec![
                "70-1372772-001/70-1372772-001-CUV.json",
                "70-1372772-001/notes.xml"
            ]
        );
        assert_eq!(
            assembly.archive.get("70-1372772-001/notes.xml"),
            Some(&b"<notes/>"[..])
        );

        let cuv: Value = serde_json::from_slice(
            assembly
                .archive
                .get("70-1372772-001/70-1372772-001-CUV.json")
                .unwrap(),
        )
        .unwrap();
        assert_eq!(cuv["RutaArchivos"], "C:\\Users\\70-1372772-001");
        assert_eq!(cuv["ResultadosValidacion"], serde_json::json!([]));
        assert!(cuv["tipoNota"].is_null());
        assert!(cuv["numNota"].is_null());

        assert_eq!(assembly.stats.groups_processed, 1);
        assert_eq!(assembly.stats.files_renamed, 1);
        assert_eq!(assembly.stats.json_normalized, 1);
        assert!(assembly.issues.is_empty());
    }

    #[test]
    fn test_otras_eps_renames_invoices() {
        let groups = tree(&[
            ("70-1372772-001/70-1372772-001.xml", "<f/>"),
            ("70-1372772-001/ResultadosMSPS_1.json", "{}"),
        ]);

        let assembly = run(&groups, ProcessingProfile::otras_eps());

        let paths: Vec<&str> = assembly.archive.paths().collect();
        assert_eq!(
            paths,
            vec![
                "70-1372772-001/FE1372772.xml",
                "70-1372772-001/70-1372772-001CUV.json"
            ]
        );
        assert_eq!(assembly.stats.files_renamed, 2);

        let cuv: Value = serde_json::from_slice(
            assembly
                .archive
                .get("70-1372772-001/70-1372772-001CUV.json")
                .unwrap(),
        )
        .unwrap();
        assert_eq!(cuv["RutaArchivos"], "C:\\Users\\70-1372772-001CUV");
    }

    #[test]
    fn test_malformed_cuv_passes_through_byte_identical() {
        let raw = "{\"tipoNota\": ";
        let groups = tree(&[("g/ResultadosMSPS_x.json", raw)]);

        let assembly = run(&groups, ProcessingProfile::coosalud());

        assert_eq!(assembly.archive.get("g/gCUV.json"), Some(raw.as_bytes()));
        assert_eq!(assembly.stats.json_normalized, 0);
        assert_eq!(assembly.stats.failed_files, 1);
        assert_eq!(assembly.issues[0].kind, FileErrorKind::JsonParse);
        assert_eq!(assembly.issues[0].file, "g/ResultadosMSPS_x.json");
        assert_eq!(assembly.issues[0].profile, Operation::Coosalud);
    }

    #[test]
    fn test_untouched_group_still_counts() {
        let groups = tree(&[("a/notes.xml", "1"), ("b/other.json", "{}")]);
        let assembly = run(&groups, ProcessingProfile::sos());

        assert_eq!(assembly.stats.groups_processed, 2);
        assert_eq!(assembly.stats.files_renamed, 0);
        assert_eq!(assembly.stats.json_normalized, 0);
    }

    #[test]
    fn test_nested_subfolders_keep_their_path() {
        let groups = tree(&[("g/sub/71-5-001.xml", "x")]);
        let assembly = run(&groups, ProcessingProfile::otras_eps());

        let paths: Vec<&str> = assembly.archive.paths().collect();
        assert_eq!(paths, vec!["g/sub/FER5.xml"]);
    }

    #[test]
    fn test_flat_batch_lands_under_virtual_group() {
        let groups = group_files(
            vec![FileEntry::new("ResultadosMSPS_1.json", b"{}".to_vec())],
            GroupingMode::Flat,
            None,
        );
        let assembly = run(&groups, ProcessingProfile::sos());

        let expected = format!("{VIRTUAL_GROUP_NAME}/{VIRTUAL_GROUP_NAME}-CUV.json");
        assert!(assembly.archive.get(&expected).is_some());
    }

    #[test]
    fn test_pdf_groups_become_inner_archives() {
        let groups = tree(&[
            ("70-1/factura.pdf", "%PDF-1"),
            ("70-1/soportes/historia.PDF", "%PDF-2"),
            ("71-2/notes.xml", "<x/>"),
        ]);

        let assembly = run(&groups, ProcessingProfile::pdf());

        let paths: Vec<&str> = assembly.archive.paths().collect();
        assert_eq!(paths, vec!["70-1/70-1.zip"]);
        assert_eq!(assembly.stats.groups_processed, 1);
        assert_eq!(assembly.stats.archives_assembled, 1);

        let inner = assembly.archive.get("70-1/70-1.zip").unwrap().to_vec();
        let mut zip = ZipArchive::new(Cursor::new(inner)).unwrap();
        let names: Vec<String> = zip.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"factura.pdf".to_string()));
        assert!(names.contains(&"historia.PDF".to_string()));

        let mut content = Vec::new();
        zip.by_name("factura.pdf")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"%PDF-1");
    }

    struct FailingNormalizer;

    impl Normalizer for FailingNormalizer {
        fn normalize(
            &self,
            _renamed_name: &str,
            _folder_name: &str,
            raw: &[u8],
            _profile: &ProcessingProfile,
        ) -> NormalizeOutcome {
            NormalizeOutcome {
                content: raw.to_vec(),
                was_modified: false,
                error: Some(FileError::new(FileErrorKind::UnexpectedShape, "boom")),
            }
        }
    }

    #[test]
    fn test_normalizer_failure_does_not_stop_siblings() {
        let groups = tree(&[
            ("a/ResultadosMSPS_1.json", "{}"),
            ("b/ResultadosMSPS_2.json", "{}"),
        ]);
        let profile = ProcessingProfile::sos();

        let assembly = assemble(&groups, &profile, &RuleRenamer, &FailingNormalizer, 9).unwrap();

        assert_eq!(assembly.archive.len(), 2);
        assert_eq!(assembly.issues.len(), 2);
        assert_eq!(assembly.archive.get("a/a-CUV.json"), Some(&b"{}"[..]));
    }

    #[test]
    fn test_assemble_workbooks() {
        let report: &[u8] = br#"{"usuarios":[{"numDocumentoIdentificacion":"123","servicios":{"consultas":[{"codigo":"A1"}]}}]}"#;
        let groups = group_files(
            vec![
                FileEntry::new("report.json", report.to_vec()),
                FileEntry::new("vacio.json", b"{}".to_vec()),
                FileEntry::new("roto.json", b"{".to_vec()),
            ],
            GroupingMode::Flat,
            None,
        );

        let assembly = assemble_workbooks(&groups, &DEFAULT_SERVICE_KEYS);

        let paths: Vec<&str> = assembly.archive.paths().collect();
        assert_eq!(paths, vec!["report.xlsx"]);
        assert_eq!(assembly.stats.files_processed, 2);
        assert_eq!(assembly.stats.workbooks_converted, 1);
        assert_eq!(assembly.stats.skipped_no_usuarios, 1);
        assert_eq!(assembly.stats.failed_files, 1);
        assert_eq!(assembly.stats.groups_processed, 1);
        assert_eq!(assembly.issues[0].file, "roto.json");
    }

    #[test]
    fn test_same_named_workbooks_are_counted_once() {
        let first: &[u8] = br#"{"usuarios":[{"numDocumentoIdentificacion":"1"}]}"#;
        let second: &[u8] = br#"{"usuarios":[{"numDocumentoIdentificacion":"2"},{"numDocumentoIdentificacion":"3"}]}"#;
        let groups = group_files(
            vec![
                FileEntry::new("g1/report.json", first.to_vec()),
                FileEntry::new("g2/report.json", second.to_vec()),
            ],
            GroupingMode::Tree,
            None,
        );

        let assembly = assemble_workbooks(&groups, &DEFAULT_SERVICE_KEYS);

        let paths: Vec<&str> = assembly.archive.paths().collect();
        assert_eq!(paths, vec!["report.xlsx"]);
        assert_eq!(assembly.stats.files_processed, 2);
        assert_eq!(assembly.stats.workbooks_converted, 1);
        assert!(assembly.issues.is_empty());

        let bytes = assembly.archive.get("report.xlsx").unwrap().to_vec();
        let mut xlsx: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let usuarios = xlsx.worksheet_range("usuarios").unwrap();
        assert_eq!(usuarios.get_size().0, 3);
    }
}
