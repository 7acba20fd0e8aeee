//! Workbook rendering
//!
//! Writes a [`FlattenedWorkbook`] as `.xlsx` bytes, one worksheet per table. The first
//! row of each sheet holds the column names.

use super::flatten::{FlattenedWorkbook, Table};
use crate::domain::{CuvsError, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::Value;

/// Longest text, in characters, an `.xlsx` cell accepts
pub const MAX_CELL_CHARS: usize = 32_767;

/// Renders a workbook to `.xlsx` bytes
///
/// # Errors
///
/// Returns [`CuvsError::Workbook`] when the workbook has no tables, a table name is not
/// a valid sheet name, or a sheet exceeds the format limits.
pub fn render_workbook(flattened: &FlattenedWorkbook) -> Result<Vec<u8>> {
    if !flattened.has_tables() {
        return Err(CuvsError::Workbook(format!(
            "{} has no tables to write",
            flattened.output_name
        )));
    }

    let mut workbook = Workbook::new();
    for table in &flattened.tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.name())?;
        write_table(worksheet, table, &flattened.source_name)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_table(worksheet: &mut Worksheet, table: &Table, source: &str) -> Result<()> {
    let columns = table.columns();

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string(0, column_index(col)?, *name)?;
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let row_num = u32::try_from(idx + 1)
            .map_err(|_| CuvsError::Workbook(format!("Too many rows in {}", table.name())))?;

        for (col, name) in columns.iter().enumerate() {
            let Some(value) = row.get(*name) else {
                continue;
            };
            let cell = CellRef {
                row: row_num,
                col: column_index(col)?,
                source,
                sheet: table.name(),
                column: *name,
            };
            write_cell(worksheet, &cell, value)?;
        }
    }

    Ok(())
}

/// Position of a cell plus the names used when reporting on it
struct CellRef<'a> {
    row: u32,
    col: u16,
    source: &'a str,
    sheet: &'a str,
    column: &'a str,
}

fn write_cell(worksheet: &mut Worksheet, cell: &CellRef<'_>, value: &Value) -> Result<()> {
    let (row, col) = (cell.row, cell.col);
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            worksheet.write_string(row, col, fit_cell_text(s, cell))?;
        }
        Value::Array(_) | Value::Object(_) => {
            let text = value.to_string();
            worksheet.write_string(row, col, fit_cell_text(&text, cell))?;
        }
    }
    Ok(())
}

/// Cuts text down to the longest string a cell can hold
fn fit_cell_text<'t>(text: &'t str, cell: &CellRef<'_>) -> &'t str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            tracing::warn!(
                file = %cell.source,
                sheet = %cell.sheet,
                column = %cell.column,
                row = cell.row,
                chars = text.chars().count(),
                "Cell text truncated to {} characters",
                MAX_CELL_CHARS
            );
            &text[..cut]
        }
        None => text,
    }
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| CuvsError::Workbook(format!("Too many columns ({col})")))
}
