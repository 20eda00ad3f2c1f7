// Excel import (xlsx, xls, xlsb, ods) and XLSX export

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use docalign_align::model::format_number;
use docalign_align::{NamedTable, Scalar, Table};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::{ExportError, LoadError};
use crate::header::HeaderBuilder;
use crate::loader::LoadOptions;

// ============================================================================
// Import
// ============================================================================

/// Load every worksheet as a table, in workbook order. Row 1 is the header.
pub fn import_bytes(
    bytes: &[u8],
    source_name: &str,
    options: &LoadOptions,
) -> Result<Vec<NamedTable>, LoadError> {
    let parse_err = |message: String| LoadError::Parse {
        source_name: source_name.to_string(),
        message,
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| parse_err(format!("Failed to open Excel file: {e}")))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut tables = Vec::with_capacity(sheet_names.len());

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| parse_err(format!("Failed to read sheet '{sheet_name}': {e}")))?;
        let table = range_to_table(&range, options)
            .map_err(|e| parse_err(format!("sheet '{sheet_name}': {e}")))?;
        log::debug!(
            "{source_name}: sheet '{sheet_name}' {} columns, {} rows",
            table.width(),
            table.len()
        );
        tables.push(NamedTable::new(sheet_name.clone(), table));
    }

    Ok(tables)
}

fn range_to_table(range: &Range<Data>, options: &LoadOptions) -> Result<Table, String> {
    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Ok(Table::default());
    };

    let mut headers = HeaderBuilder::new();
    for cell in header_row {
        headers.push(&cell_to_scalar(cell, true).to_string());
    }
    let columns = headers.finish();

    let mut rows = Vec::new();
    for row in rows_iter {
        // A sheet row has no delimiters, so an all-empty row is a blank line.
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        rows.push(row.iter().map(|c| cell_to_scalar(c, options.infer_types)).collect());
    }

    Table::new(columns, rows).map_err(|e| e.to_string())
}

/// Map a calamine cell to a scalar. With `infer_types` off every non-empty
/// cell becomes text in its display form.
fn cell_to_scalar(cell: &Data, infer_types: bool) -> Scalar {
    let typed = match cell {
        Data::Empty => return Scalar::Null,
        Data::String(s) if s.is_empty() => return Scalar::Null,
        Data::String(s) => return Scalar::text(s.as_str()),
        Data::Float(n) => Scalar::Number(*n),
        Data::Int(n) => Scalar::Number(*n as f64),
        Data::Bool(b) => Scalar::Bool(*b),
        // Serial date number (1900 system)
        Data::DateTime(dt) => Scalar::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => return Scalar::text(s.as_str()),
        Data::Error(e) => return Scalar::Text(format!("#{e:?}")),
    };

    if infer_types {
        typed
    } else {
        Scalar::Text(typed.to_string())
    }
}

// ============================================================================
// Export
// ============================================================================

/// Build an XLSX workbook with one worksheet per `(sheet name, table)`.
pub fn export_sheets(sheets: &[(&str, &Table)]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for (name, table) in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(*name)
            .map_err(|e| ExportError::Xlsx(format!("Failed to create sheet '{name}': {e}")))?;
        write_table(worksheet, table, &header_format)?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ExportError::Xlsx(format!("Failed to build XLSX file: {e}")))
}

fn write_table(worksheet: &mut Worksheet, table: &Table, header_format: &Format) -> Result<(), ExportError> {
    for (c, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_num(c)?, name, header_format)
            .map_err(xlsx_err)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let row_num = u32::try_from(r + 1)
            .map_err(|_| ExportError::Xlsx(format!("row {r} exceeds the worksheet limit")))?;
        for (c, value) in row.iter().enumerate() {
            let col = col_num(c)?;
            match value {
                Scalar::Null => {}
                Scalar::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b).map_err(xlsx_err)?;
                }
                Scalar::Number(n) if n.is_finite() => {
                    worksheet.write_number(row_num, col, *n).map_err(xlsx_err)?;
                }
                // Excel has no NaN/inf
                Scalar::Number(n) => {
                    worksheet.write_string(row_num, col, format_number(*n)).map_err(xlsx_err)?;
                }
                Scalar::Text(s) => {
                    worksheet.write_string(row_num, col, s).map_err(xlsx_err)?;
                }
            }
        }
    }

    Ok(())
}

fn col_num(col: usize) -> Result<u16, ExportError> {
    u16::try_from(col).map_err(|_| ExportError::Xlsx(format!("column {col} exceeds the worksheet limit")))
}

fn xlsx_err(e: XlsxError) -> ExportError {
    ExportError::Xlsx(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["id".into(), "name".into(), "active".into()],
            vec![
                vec![Scalar::Number(1.0), "Alice".into(), Scalar::Bool(true)],
                vec![Scalar::Number(2.5), Scalar::Null, Scalar::Bool(false)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_export_then_import_keeps_types() {
        let t = sample();
        let bytes = export_sheets(&[("First", &t), ("Second", &Table::default())]).unwrap();
        let tables = import_bytes(&bytes, "book.xlsx", &LoadOptions::default()).unwrap();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "First");
        assert_eq!(tables[0].table, t);
        assert_eq!(tables[1].name, "Second");
        assert!(tables[1].table.is_empty());
    }

    #[test]
    fn test_raw_strings_import() {
        let bytes = export_sheets(&[("S", &sample())]).unwrap();
        let opts = LoadOptions { infer_types: false };
        let tables = import_bytes(&bytes, "book.xlsx", &opts).unwrap();
        assert_eq!(
            tables[0].table.rows()[0],
            vec![Scalar::text("1"), Scalar::text("Alice"), Scalar::text("TRUE")]
        );
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = import_bytes(b"not a workbook", "junk.xlsx", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(err.to_string().starts_with("junk.xlsx: parse error"));
    }

    #[test]
    fn test_cell_mapping() {
        assert_eq!(cell_to_scalar(&Data::Empty, true), Scalar::Null);
        assert_eq!(cell_to_scalar(&Data::String(String::new()), true), Scalar::Null);
        assert_eq!(cell_to_scalar(&Data::Int(7), true), Scalar::Number(7.0));
        assert_eq!(cell_to_scalar(&Data::Float(7.0), false), Scalar::text("7"));
        assert_eq!(cell_to_scalar(&Data::Bool(true), true), Scalar::Bool(true));
    }
}
