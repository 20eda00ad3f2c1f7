// Table loading: file bytes -> ordered named tables

use std::fmt;
use std::path::Path;

use docalign_align::{NamedTable, Table};

use crate::error::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    Csv,
    Tsv,
    Xlsx,
    Xls,
    Xlsb,
    Ods,
    Json,
}

impl TableFormat {
    pub fn from_extension(ext: &str) -> Result<Self, LoadError> {
        match ext.to_lowercase().as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "xlsb" => Ok(Self::Xlsb),
            "ods" => Ok(Self::Ods),
            "json" => Ok(Self::Json),
            other => Err(LoadError::UnsupportedFormat(format!(
                "extension \"{other}\" (expected csv, tsv, xlsx, xls, xlsb, ods or json)"
            ))),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            LoadError::UnsupportedFormat(format!("{} has no file extension", path.display()))
        })?;
        Self::from_extension(ext)
    }

    pub fn is_workbook(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls | Self::Xlsb | Self::Ods)
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
            Self::Xlsb => "xlsb",
            Self::Ods => "ods",
            Self::Json => "json",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    /// Recognize numbers and booleans in untyped sources. Off keeps text as-is.
    pub infer_types: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { infer_types: true }
    }
}

/// Parse `bytes` as `format`. Delimited and JSON sources yield a single table
/// named `name`; workbooks yield one table per sheet.
pub fn load_bytes(
    bytes: &[u8],
    format: TableFormat,
    name: &str,
    options: &LoadOptions,
) -> Result<Vec<NamedTable>, LoadError> {
    let single = |table: Table| vec![NamedTable::new(name, table)];
    match format {
        TableFormat::Csv => crate::csv::import_bytes(bytes, None, name, options).map(single),
        TableFormat::Tsv => crate::csv::import_bytes(bytes, Some(b'\t'), name, options).map(single),
        TableFormat::Json => crate::json::import_bytes(bytes, name, options).map(single),
        TableFormat::Xlsx | TableFormat::Xls | TableFormat::Xlsb | TableFormat::Ods => {
            crate::xlsx::import_bytes(bytes, name, options)
        }
    }
}

/// Read and parse a file, inferring the format from its extension.
pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Vec<NamedTable>, LoadError> {
    let format = TableFormat::from_path(path)?;
    let bytes = std::fs::read(path)
        .map_err(|e| LoadError::Io(format!("cannot read {}: {e}", path.display())))?;
    load_bytes(&bytes, format, &source_name(path), options)
}

/// Name a single-table source after its file stem.
pub fn source_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string()
}

/// Pick a sheet by name, or the first one when `sheet` is `None`.
pub fn select_sheet<'a>(tables: &'a [NamedTable], sheet: Option<&str>) -> Result<&'a NamedTable, LoadError> {
    let found = match sheet {
        Some(name) => tables.iter().find(|t| t.name == name),
        None => tables.first(),
    };
    found.ok_or_else(|| LoadError::SheetNotFound {
        sheet: sheet.unwrap_or("(first)").to_string(),
        available: tables.iter().map(|t| t.name.clone()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_from_extension() {
        assert_eq!(TableFormat::from_path(&PathBuf::from("a/B.XLSX")).unwrap(), TableFormat::Xlsx);
        assert_eq!(TableFormat::from_path(&PathBuf::from("b.tsv")).unwrap(), TableFormat::Tsv);
        assert!(TableFormat::from_path(&PathBuf::from("b.ods")).unwrap().is_workbook());
        let err = TableFormat::from_path(&PathBuf::from("report.pdf")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
        assert!(TableFormat::from_path(&PathBuf::from("noext")).is_err());
    }

    #[test]
    fn csv_named_after_source() {
        let tables = load_bytes(b"id\n1\n", TableFormat::Csv, "vendors", &LoadOptions::default()).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "vendors");
    }

    #[test]
    fn tsv_uses_tab_even_with_commas() {
        let tables = load_bytes(b"id\tnote\n1\ta,b\n", TableFormat::Tsv, "t", &LoadOptions::default()).unwrap();
        assert_eq!(tables[0].table.columns(), ["id", "note"]);
    }

    #[test]
    fn select_sheet_by_name_or_first() {
        let tables = vec![
            NamedTable::new("One", Table::default()),
            NamedTable::new("Two", Table::default()),
        ];
        assert_eq!(select_sheet(&tables, None).unwrap().name, "One");
        assert_eq!(select_sheet(&tables, Some("Two")).unwrap().name, "Two");
        let err = select_sheet(&tables, Some("Three")).unwrap_err();
        assert_eq!(err.to_string(), "sheet 'Three' not found (available: One, Two)");
        assert!(select_sheet(&[], None).is_err());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_path(Path::new("/nonexistent/dir/file.csv"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
