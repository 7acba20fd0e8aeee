//! CUV JSON normalization
//!
//! Rewrites the validation-result payload (`*cuv.json`) the way the destination portals
//! expect it: `RutaArchivos` always points at the claim, and `ResultadosValidacion`,
//! `tipoNota` and `numNota` are filled in only when absent. Unknown keys survive
//! untouched and keep their order; output is indented with two spaces.

use super::rename::stem_of;
use crate::domain::{
    FileError, FileErrorKind, ProcessingProfile, RutaArchivosSource, CUV_JSON_SUFFIX,
};
use serde_json::Value;

const RUTA_ARCHIVOS_KEY: &str = "RutaArchivos";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Result of normalizing one file
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOutcome {
    /// Bytes to write (the original bytes when nothing was changed)
    pub content: Vec<u8>,

    /// Whether the payload was parsed and rewritten
    pub was_modified: bool,

    /// Recoverable failure, if any
    pub error: Option<FileError>,
}

impl NormalizeOutcome {
    fn pass_through(raw: &[u8], error: Option<FileError>) -> Self {
        Self {
            content: raw.to_vec(),
            was_modified: false,
            error,
        }
    }
}

/// Seam used by the archive assembler to rewrite CUV payloads
pub trait Normalizer {
    /// Normalizes `raw` for a file already renamed to `renamed_name`
    fn normalize(
        &self,
        renamed_name: &str,
        folder_name: &str,
        raw: &[u8],
        profile: &ProcessingProfile,
    ) -> NormalizeOutcome;
}

/// [`Normalizer`] applying the profile's CUV defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct CuvNormalizer;

impl Normalizer for CuvNormalizer {
    fn normalize(
        &self,
        renamed_name: &str,
        folder_name: &str,
        raw: &[u8],
        profile: &ProcessingProfile,
    ) -> NormalizeOutcome {
        normalize_cuv(renamed_name, folder_name, raw, profile)
    }
}

/// Whether a (renamed) file is a CUV payload
pub fn is_cuv_json(name: &str) -> bool {
    name.to_lowercase().ends_with(CUV_JSON_SUFFIX)
}

/// Normalizes a CUV payload
///
/// Files whose name does not end in `cuv.json` are returned unchanged. Malformed JSON
/// is returned unchanged together with a [`FileErrorKind::JsonParse`] error.
///
/// # Examples
///
/// ```
/// use cuvs::core::transform::normalize::normalize_cuv;
/// use cuvs::domain::ProcessingProfile;
///
/// let profile = ProcessingProfile::sos();
/// let outcome = normalize_cuv("70-1-CUV.json", "70-1", br#"{"tipoNota": 5}"#, &profile);
///
/// let json: serde_json::Value = serde_json::from_slice(&outcome.content).unwrap();
/// assert!(outcome.was_modified);
/// assert_eq!(json["tipoNota"], 5);
/// assert!(json["numNota"].is_null());
/// assert_eq!(json["RutaArchivos"], "C:\\Users\\70-1");
/// ```
pub fn normalize_cuv(
    renamed_name: &str,
    folder_name: &str,
    raw: &[u8],
    profile: &ProcessingProfile,
) -> NormalizeOutcome {
    if !is_cuv_json(renamed_name) {
        return NormalizeOutcome::pass_through(raw, None);
    }

    let body = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    let mut payload: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            return NormalizeOutcome::pass_through(raw, Some(FileError::json_parse(e.to_string())))
        }
    };

    let Some(map) = payload.as_object_mut() else {
        return NormalizeOutcome::pass_through(
            raw,
            Some(FileError::new(
                FileErrorKind::UnexpectedShape,
                "CUV payload is not a JSON object",
            )),
        );
    };

    map.insert(
        RUTA_ARCHIVOS_KEY.to_string(),
        Value::String(ruta_archivos(renamed_name, folder_name, profile)),
    );

    for (key, default) in profile.cuv_defaults.entries() {
        if !map.contains_key(key) {
            map.insert(key.to_string(), default.clone());
        }
    }

    match serde_json::to_vec_pretty(&payload) {
        Ok(content) => NormalizeOutcome {
            content,
            was_modified: true,
            error: None,
        },
        Err(e) => NormalizeOutcome::pass_through(
            raw,
            Some(FileError::new(FileErrorKind::UnexpectedShape, e.to_string())),
        ),
    }
}

fn ruta_archivos(renamed_name: &str, folder_name: &str, profile: &ProcessingProfile) -> String {
    let name = match profile.ruta_archivos_source {
        RutaArchivosSource::File => stem_of(renamed_name),
        RutaArchivosSource::Folder => folder_name,
    };
    format!("{}{}", profile.ruta_archivos_prefix, name)
}
