use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AlignError;

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// A single cell value as produced by a loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Locale-free display form. `Null` renders empty, integral numbers drop the
/// decimal part, booleans use spreadsheet casing.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(true) => write!(f, "TRUE"),
            Self::Bool(false) => write!(f, "FALSE"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Format a number without separators: integers without decimals
/// (`1.0` -> `1`), everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Named columns plus rows stored positionally against the header.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl Table {
    /// Build a table, checking column names are unique and every row is
    /// exactly as wide as the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self, AlignError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(AlignError::InvalidTable(format!("duplicate column '{name}'")));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(AlignError::InvalidTable(format!(
                    "row {i} has {} values, header has {} columns",
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Table with a header and no rows.
    pub fn with_columns(columns: Vec<String>) -> Result<Self, AlignError> {
        Self::new(columns, Vec::new())
    }

    /// Caller guarantees unique columns and matching row widths.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Scalar]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of `column` in row `row`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Scalar> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// All values of one column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a Scalar> + 'a> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(move |r| &r[col]))
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Scalar>>) {
        (self.columns, self.rows)
    }
}

/// A table plus the name it was loaded under (sheet name or file stem).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTable {
    pub name: String,
    pub table: Table,
}

impl NamedTable {
    pub fn new(name: impl Into<String>, table: Table) -> Self {
        Self { name: name.into(), table }
    }
}

// ---------------------------------------------------------------------------
// Alignment output
// ---------------------------------------------------------------------------

/// Classified output of one template/input alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub key: String,
    pub matched: Table,
    pub template_only: Table,
    pub input_only: Table,
    pub provenance: Provenance,
}

/// Source row indices for every output row, parallel to the output tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Provenance {
    /// `(template_row, input_row)` per matched row.
    pub matched: Vec<(usize, usize)>,
    pub template_only: Vec<usize>,
    pub input_only: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Deduplication output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupeOutcome {
    pub table: Table,
    /// Number of rows discarded as later duplicates.
    pub removed: usize,
    /// Normalized keys that had at least one duplicate, in first-duplicate order.
    pub duplicate_keys: Vec<String>,
}
