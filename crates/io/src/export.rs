// Result export: XLSX workbooks, CSV files, JSON

use std::path::{Path, PathBuf};

use docalign_align::{ResultSet, Table};
use serde::Serialize;

use crate::error::ExportError;

/// Worksheet names for the three alignment tables.
pub const SHEET_MATCHING: &str = "Matching";
pub const SHEET_TEMPLATE_ONLY: &str = "Template_Only";
pub const SHEET_INPUT_ONLY: &str = "Input_Only";

/// Workbook with `Matching`, `Template_Only` and `Input_Only` sheets.
pub fn export_result_xlsx(result: &ResultSet) -> Result<Vec<u8>, ExportError> {
    crate::xlsx::export_sheets(&[
        (SHEET_MATCHING, &result.matched),
        (SHEET_TEMPLATE_ONLY, &result.template_only),
        (SHEET_INPUT_ONLY, &result.input_only),
    ])
}

pub fn export_table_xlsx(table: &Table, sheet: &str) -> Result<Vec<u8>, ExportError> {
    crate::xlsx::export_sheets(&[(sheet, table)])
}

pub fn export_table_csv(table: &Table, delimiter: u8) -> Result<Vec<u8>, ExportError> {
    crate::csv::export_bytes(table, delimiter)
}

pub fn export_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec_pretty(value).map_err(|e| ExportError::Json(e.to_string()))
}

pub fn write_result_xlsx(result: &ResultSet, path: &Path) -> Result<(), ExportError> {
    write_bytes(path, &export_result_xlsx(result)?)
}

pub fn write_table_xlsx(table: &Table, sheet: &str, path: &Path) -> Result<(), ExportError> {
    write_bytes(path, &export_table_xlsx(table, sheet)?)
}

/// Write `<stem>_matching.csv`, `<stem>_template_only.csv` and
/// `<stem>_input_only.csv` into `dir`. Returns the written paths.
pub fn write_result_csv(result: &ResultSet, dir: &Path, stem: &str) -> Result<Vec<PathBuf>, ExportError> {
    let parts = [
        ("matching", &result.matched),
        ("template_only", &result.template_only),
        ("input_only", &result.input_only),
    ];
    let mut written = Vec::with_capacity(parts.len());
    for (suffix, table) in parts {
        let path = dir.join(format!("{stem}_{suffix}.csv"));
        write_bytes(&path, &export_table_csv(table, b',')?)?;
        written.push(path);
    }
    Ok(written)
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes)
        .map_err(|e| ExportError::Io(format!("cannot write {}: {e}", path.display())))
}

/// Default file name for the alignment of one input, e.g. `alignment_sales.xlsx`.
pub fn alignment_file_name(input_stem: &str, extension: &str) -> String {
    format!("alignment_{input_stem}.{extension}")
}
