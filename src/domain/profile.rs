//! Processing profiles
//!
//! Each destination portal gets its layout from a [`ProcessingProfile`]: an ordered set
//! of prefix rename rules, a suffix to strip, how the CUV file is named and which
//! defaults are injected into it. Profiles are data, so the engine has a single code
//! path for all of them.

use crate::domain::{CuvsError, Result};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Marker that identifies the validation-result file exported by the ministry portal
pub const CUV_SOURCE_MARKER: &str = "ResultadosMSPS_";

/// Case-insensitive suffix that selects files for JSON normalization
pub const CUV_JSON_SUFFIX: &str = "cuv.json";

/// Default prefix of the `RutaArchivos` value
pub const DEFAULT_RUTA_ARCHIVOS_PREFIX: &str = "C:\\Users\\";

const COOSALUD_FED129_DESCRIPTION: &str = "[Interoperabilidad.Group.Collection.AdditionalInformation.NUMERO_CONTRATO.Value] El apartado no existe o no tiene valor en el XML del documento electrónico. Por favor verifique que la etiqueta Xml use mayúsculas y minúsculas según resolución";

/// Operation requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// S.O.S validation layout
    Sos,
    /// Layout shared by the remaining EPS portals
    OtrasEps,
    /// Coosalud layout
    Coosalud,
    /// One nested ZIP of PDFs per claim folder
    Pdf,
    /// JSON to spreadsheet conversion
    Excel,
}

impl Operation {
    /// All operations, in menu order
    pub const ALL: [Operation; 5] = [
        Operation::Pdf,
        Operation::OtrasEps,
        Operation::Coosalud,
        Operation::Sos,
        Operation::Excel,
    ];

    /// Stable identifier used on the command line and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Sos => "sos",
            Operation::OtrasEps => "otras-eps",
            Operation::Coosalud => "coosalud",
            Operation::Pdf => "pdf",
            Operation::Excel => "excel",
        }
    }

    /// Profile driving the renaming pipeline, `None` for the Excel conversion
    pub fn profile(&self) -> Option<ProcessingProfile> {
        match self {
            Operation::Sos => Some(ProcessingProfile::sos()),
            Operation::OtrasEps => Some(ProcessingProfile::otras_eps()),
            Operation::Coosalud => Some(ProcessingProfile::coosalud()),
            Operation::Pdf => Some(ProcessingProfile::pdf()),
            Operation::Excel => None,
        }
    }

    /// Extensions kept before grouping
    pub fn extension_filter(&self) -> &'static [&'static str] {
        match self {
            Operation::Sos | Operation::OtrasEps | Operation::Coosalud => &[".json", ".xml"],
            Operation::Pdf => &[".pdf"],
            Operation::Excel => &[".json"],
        }
    }

    /// Conventional file name of the produced archive
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Operation::Sos => "json_sos_procesados.zip",
            Operation::OtrasEps => "json_otras_eps_procesados.zip",
            Operation::Coosalud => "json_coosalud_procesados.zip",
            Operation::Pdf => "pdfs_comprimidos.zip",
            Operation::Excel => "archivos_excel.zip",
        }
    }

    /// Title shown when the run produced output
    pub fn success_title(&self) -> &'static str {
        match self {
            Operation::Sos => "Validación S.O.S completada",
            Operation::OtrasEps => "Procesamiento otras EPS completado",
            Operation::Coosalud => "Procesamiento Coosalud finalizado",
            Operation::Pdf => "Compresión completada exitosamente",
            Operation::Excel => "Conversión a Excel finalizada",
        }
    }

    /// Message shown when nothing qualified
    pub fn empty_message(&self) -> &'static str {
        match self {
            Operation::Sos | Operation::Coosalud => "No se encontraron carpetas para procesar",
            Operation::OtrasEps => {
                "No se encontraron carpetas que requieran procesamiento para otras EPS"
            }
            Operation::Pdf => "No se encontraron subcarpetas con archivos PDF para comprimir",
            Operation::Excel => "No se encontraron archivos JSON válidos para convertir",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CuvsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['_', '.', ' '], "-").as_str() {
            "sos" | "s-o-s" => Ok(Self::Sos),
            "otras-eps" | "otraseps" => Ok(Self::OtrasEps),
            "coosalud" => Ok(Self::Coosalud),
            "pdf" | "comprimir-pdf" => Ok(Self::Pdf),
            "excel" | "xlsx" => Ok(Self::Excel),
            _ => Err(CuvsError::Configuration(format!(
                "Invalid profile: {s}. Expected one of: sos, otras-eps, coosalud, pdf, excel"
            ))),
        }
    }
}

/// One prefix rename rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    /// Literal prefix to look for
    pub prefix: String,
    /// Text that replaces the prefix
    pub replacement: String,
}

impl RenameRule {
    /// Creates a new rule
    pub fn new(prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            replacement: replacement.into(),
        }
    }
}

/// Where the `RutaArchivos` value takes its name from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RutaArchivosSource {
    /// Renamed file name without extension
    File,
    /// Group (claim folder) name
    Folder,
}

/// How transformed entries are laid out in the output archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveLayout {
    /// Every file at its (renamed) relative path
    Flat,
    /// One inner ZIP per group at `{group}/{group}.zip`
    Nested,
}

/// Values injected into a CUV payload when the key is absent
#[derive(Debug, Clone, PartialEq)]
pub struct CuvDefaults {
    /// Default for `ResultadosValidacion`
    pub resultados_validacion: Value,
    /// Default for `tipoNota`
    pub tipo_nota: Value,
    /// Default for `numNota`
    pub num_nota: Value,
}

impl CuvDefaults {
    /// Defaults with an empty validation result list
    pub fn empty_results() -> Self {
        Self {
            resultados_validacion: json!([]),
            tipo_nota: Value::Null,
            num_nota: Value::Null,
        }
    }

    /// Key/value pairs in the order they are appended to a payload
    pub fn entries(&self) -> [(&'static str, &Value); 3] {
        [
            ("ResultadosValidacion", &self.resultados_validacion),
            ("tipoNota", &self.tipo_nota),
            ("numNota", &self.num_nota),
        ]
    }
}

/// Static description of one destination layout
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingProfile {
    /// Operation this profile implements
    pub operation: Operation,
    /// Prefix rules, scanned in order, first match wins
    pub rename_rules: Vec<RenameRule>,
    /// First occurrence removed after the prefix rules (empty = nothing)
    pub suffix_to_strip: String,
    /// Between the folder name and `CUV` in the renamed CUV file
    pub cuv_separator: String,
    /// Defaults for absent CUV fields
    pub cuv_defaults: CuvDefaults,
    /// Source of the `RutaArchivos` name
    pub ruta_archivos_source: RutaArchivosSource,
    /// Prefix of the `RutaArchivos` value
    pub ruta_archivos_prefix: String,
    /// Output layout
    pub layout: ArchiveLayout,
}

impl ProcessingProfile {
    /// S.O.S: only the CUV file is renamed, `RutaArchivos` points at the folder
    pub fn sos() -> Self {
        Self {
            operation: Operation::Sos,
            rename_rules: Vec::new(),
            suffix_to_strip: String::new(),
            cuv_separator: "-".to_string(),
            cuv_defaults: CuvDefaults::empty_results(),
            ruta_archivos_source: RutaArchivosSource::Folder,
            ruta_archivos_prefix: DEFAULT_RUTA_ARCHIVOS_PREFIX.to_string(),
            layout: ArchiveLayout::Flat,
        }
    }

    /// Otras EPS: invoice prefixes rewritten, `-001` dropped
    pub fn otras_eps() -> Self {
        Self {
            operation: Operation::OtrasEps,
            rename_rules: invoice_prefix_rules(),
            suffix_to_strip: "-001".to_string(),
            cuv_separator: String::new(),
            cuv_defaults: CuvDefaults::empty_results(),
            ruta_archivos_source: RutaArchivosSource::File,
            ruta_archivos_prefix: DEFAULT_RUTA_ARCHIVOS_PREFIX.to_string(),
            layout: ArchiveLayout::Flat,
        }
    }

    /// Coosalud: Otras EPS renaming plus a pre-filled FED129 notification
    pub fn coosalud() -> Self {
        Self {
            operation: Operation::Coosalud,
            cuv_defaults: CuvDefaults {
                resultados_validacion: json!([{
                    "Clase": "NOTIFICACION",
                    "Codigo": "FED129",
                    "Descripcion": COOSALUD_FED129_DESCRIPTION,
                    "Observaciones": "",
                    "PathFuente": "",
                    "Fuente": "FacturaElectronica"
                }]),
                tipo_nota: Value::Null,
                num_nota: Value::Null,
            },
            ..Self::otras_eps()
        }
    }

    /// PDF compression: no renaming, nested archives
    pub fn pdf() -> Self {
        Self {
            operation: Operation::Pdf,
            rename_rules: Vec::new(),
            suffix_to_strip: String::new(),
            cuv_separator: String::new(),
            cuv_defaults: CuvDefaults::empty_results(),
            ruta_archivos_source: RutaArchivosSource::File,
            ruta_archivos_prefix: DEFAULT_RUTA_ARCHIVOS_PREFIX.to_string(),
            layout: ArchiveLayout::Nested,
        }
    }

    /// Replaces the `RutaArchivos` prefix
    pub fn with_ruta_archivos_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ruta_archivos_prefix = prefix.into();
        self
    }

    /// Profile name for logs
    pub fn name(&self) -> &'static str {
        self.operation.as_str()
    }
}

fn invoice_prefix_rules() -> Vec<RenameRule> {
    vec![
        RenameRule::new("70-", "FE"),
        RenameRule::new("71-", "FER"),
        RenameRule::new("77-", "FCTG"),
    ]
}
