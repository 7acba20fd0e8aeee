//! Tabular flattening
//!
//! Converts a RIPS-style payload (`usuarios[].servicios.<key>[]`) into flat tables,
//! one workbook per source file:
//! - `"usuarios"` holds the user records as they are
//! - one table per service key, each item tagged with the owning user's document
//!   number in `usuario_documento`
//!
//! Service tables are only created when they have rows; downstream tools read the
//! presence of a sheet as a signal.

use crate::domain::{FileEntry, FileError};
use indexmap::IndexSet;
use serde_json::{Map, Value};

/// Service keys read from `servicios`, in sheet order
pub const DEFAULT_SERVICE_KEYS: [&str; 7] = [
    "consultas",
    "medicamentos",
    "procedimientos",
    "urgencias",
    "hospitalizacion",
    "recienNacidos",
    "otrosServicios",
];

/// Name of the user table
pub const USUARIOS_TABLE: &str = "usuarios";

/// Column injected into every service row
pub const USUARIO_DOCUMENTO_COLUMN: &str = "usuario_documento";

const SERVICIOS_FIELD: &str = "servicios";
const DOCUMENT_FIELD: &str = "numDocumentoIdentificacion";

/// One table row, columns in insertion order
pub type Row = Map<String, Value>;

/// A named, ordered list of rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    rows: Vec<Row>,
}

impl Table {
    /// Creates a table
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Table (sheet) name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows in source order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Union of all row keys, in first-seen order
    ///
    /// Rows may be heterogeneous; a row lacking a column leaves that cell empty.
    pub fn columns(&self) -> Vec<&str> {
        let columns: IndexSet<&str> = self
            .rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        columns.into_iter().collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Tables produced from one source file
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedWorkbook {
    /// Name of the source JSON file
    pub source_name: String,

    /// Output file name (`.json` replaced by `.xlsx`)
    pub output_name: String,

    /// Tables in sheet order
    pub tables: Vec<Table>,
}

impl FlattenedWorkbook {
    /// Whether there is anything to write
    pub fn has_tables(&self) -> bool {
        !self.tables.is_empty()
    }

    /// Table names in sheet order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(Table::name).collect()
    }
}

/// Output name of the workbook generated from `source_name`
///
/// # Examples
///
/// ```
/// use cuvs::core::transform::flatten::workbook_name;
///
/// assert_eq!(workbook_name("report.json"), "report.xlsx");
/// assert_eq!(workbook_name("RIPS.JSON"), "RIPS.xlsx");
/// ```
pub fn workbook_name(source_name: &str) -> String {
    let stem = match source_name.len().checked_sub(".json".len()) {
        Some(idx)
            if source_name.is_char_boundary(idx)
                && source_name[idx..].eq_ignore_ascii_case(".json") =>
        {
            &source_name[..idx]
        }
        _ => source_name,
    };
    format!("{stem}.xlsx")
}

/// Flattens one parsed payload into tables
///
/// Returns no tables when `usuarios` is absent or not an array.
pub fn flatten_document<S: AsRef<str>>(payload: &Value, service_keys: &[S]) -> Vec<Table> {
    let Some(usuarios) = payload.get(USUARIOS_TABLE).and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut tables = Vec::with_capacity(service_keys.len() + 1);
    tables.push(Table::new(
        USUARIOS_TABLE,
        usuarios.iter().map(user_row).collect(),
    ));

    for key in service_keys {
        let key = key.as_ref();
        let rows: Vec<Row> = usuarios
            .iter()
            .flat_map(|user| service_rows(user, key))
            .collect();

        if !rows.is_empty() {
            tables.push(Table::new(key, rows));
        }
    }

    tables
}

/// Parses and flattens one source file
///
/// # Errors
///
/// Returns a [`FileErrorKind::JsonParse`](crate::domain::FileErrorKind::JsonParse) error when
/// the file is not valid JSON.
pub fn flatten_file<S: AsRef<str>>(
    file: &FileEntry,
    service_keys: &[S],
) -> std::result::Result<FlattenedWorkbook, FileError> {
    let body = file
        .content()
        .strip_prefix(b"\xEF\xBB\xBF")
        .unwrap_or(file.content());
    let payload: Value =
        serde_json::from_slice(body).map_err(|e| FileError::json_parse(e.to_string()))?;

    Ok(FlattenedWorkbook {
        source_name: file.name().to_string(),
        output_name: workbook_name(file.name()),
        tables: flatten_document(&payload, service_keys),
    })
}

/// Object users become their own row; anything else becomes an empty row
fn user_row(user: &Value) -> Row {
    user.as_object().cloned().unwrap_or_default()
}

fn service_rows(user: &Value, service_key: &str) -> Vec<Row> {
    let Some(user) = user.as_object() else {
        return Vec::new();
    };

    let documento = user.get(DOCUMENT_FIELD).cloned().unwrap_or(Value::Null);
    let items = user
        .get(SERVICIOS_FIELD)
        .and_then(|s| s.get(service_key))
        .and_then(Value::as_array);

    items
        .into_iter()
        .flatten()
        .map(|item| {
            let mut row = item.as_object().cloned().unwrap_or_default();
            row.insert(USUARIO_DOCUMENTO_COLUMN.to_string(), documento.clone());
            row
        })
        .collect()
}
